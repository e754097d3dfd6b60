use std::io::{self, Write};

use serde::Serialize;

use crate::app::{ListResult, ProgressEvent, ProgressSink};
use crate::detail::DatasetDetail;
use crate::filter::FilterOptions;
use crate::site::RenderResult;
use crate::table::{NO_INFO, NO_LINKS, NO_RESULTS, TableView};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_list(result: &ListResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_facets(options: &FilterOptions) -> io::Result<()> {
        Self::print_json(options)
    }

    pub fn print_detail(detail: &DatasetDetail) -> io::Result<()> {
        Self::print_json(detail)
    }

    pub fn print_render(result: &RenderResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Plain terminal rendering for interactive runs that do not need the
/// full-screen browser. Progress goes to stderr, results to the writer.
pub struct TextOutput;

impl TextOutput {
    pub fn write_list<W: Write>(out: &mut W, total: usize, view: &TableView) -> io::Result<()> {
        let rows = view.rows();
        writeln!(out, "{} of {total} datasets", rows.len())?;
        if matches!(view, TableView::NoResults) {
            writeln!(out, "{NO_RESULTS}")?;
            return Ok(());
        }
        for row in rows {
            writeln!(out)?;
            match &row.year {
                Some(year) => writeln!(out, "{} ({year})  [{}]", row.name, row.id)?,
                None => writeln!(out, "{}  [{}]", row.name, row.id)?,
            }
            if !row.badges.is_empty() {
                let badges: Vec<String> = row
                    .badges
                    .iter()
                    .map(|badge| format!("{}: {}", badge.kind.title(), badge.text))
                    .collect();
                writeln!(out, "  {}", badges.join(" | "))?;
            }
            if row.links.is_empty() {
                writeln!(out, "  {NO_LINKS}")?;
            }
            for link in &row.links {
                writeln!(out, "  {:<7} {}", link.kind.title(), link.url)?;
            }
            if row.info.is_empty() {
                writeln!(out, "  {NO_INFO}")?;
            }
            for line in &row.info {
                match line.label {
                    Some(label) => writeln!(out, "  {label}: {}", line.text)?,
                    None => writeln!(out, "  {}", line.text)?,
                }
            }
        }
        Ok(())
    }

    pub fn write_facets<W: Write>(out: &mut W, options: &FilterOptions) -> io::Result<()> {
        writeln!(out, "Organs:    {}", options.organs.join(", "))?;
        writeln!(out, "Staining:  {}", options.staining.join(", "))?;
        let structure: Vec<&str> = options.structure.iter().map(|s| s.label()).collect();
        writeln!(out, "Structure: {}", structure.join(", "))?;
        let tasks: Vec<&str> = options.tasks.iter().map(|t| t.label()).collect();
        writeln!(out, "Tasks:     {}", tasks.join(", "))?;
        writeln!(out, "Years:     {}", options.years.join(", "))?;
        Ok(())
    }

    pub fn write_detail<W: Write>(out: &mut W, detail: &DatasetDetail) -> io::Result<()> {
        let dataset = &detail.dataset;
        match &dataset.year {
            Some(year) => writeln!(out, "{} ({year})", dataset.name)?,
            None => writeln!(out, "{}", dataset.name)?,
        }
        writeln!(out)?;
        if detail.basic_info.is_empty() {
            writeln!(out, "No basic information")?;
        }
        let width = detail
            .basic_info
            .iter()
            .map(|item| item.label.len())
            .max()
            .unwrap_or(0);
        for item in &detail.basic_info {
            writeln!(out, "{:<width$}  {}", item.label, item.value)?;
        }
        writeln!(out)?;
        match &detail.body {
            Some(body) => writeln!(out, "{}", body.trim_end())?,
            None => writeln!(out, "No detailed description")?,
        }
        Ok(())
    }

    pub fn write_render<W: Write>(out: &mut W, result: &RenderResult) -> io::Result<()> {
        writeln!(
            out,
            "Wrote {} ({} datasets, {} detail pages)",
            result.index,
            result.datasets,
            result.details.len()
        )?;
        if !result.skipped.is_empty() {
            writeln!(out, "Skipped: {}", result.skipped.join(", "))?;
        }
        Ok(())
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => eprintln!("{} ({} ms)", event.message, elapsed.as_millis()),
            None => eprintln!("{}", event.message),
        }
    }
}
