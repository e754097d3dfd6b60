//! HTML rendering for the static catalog pages.
//!
//! Every catalog-provided string goes through [`escape`] or [`escape_attr`];
//! only the rendered Markdown body is inserted verbatim.

use std::borrow::Cow;
use std::fmt::Write;

use crate::detail::{BodyFormat, DatasetDetail, render_body_html};
use crate::table::{DisplayRow, NO_INFO, NO_LINKS, NO_RESULTS, TableView};

const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

pub fn escape_attr(s: &str) -> Cow<'_, str> {
    escape(s)
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%}\
td,th{border-bottom:1px solid #ddd;padding:.5rem;vertical-align:top;text-align:left}\
.meta-tag,.meta-badge{display:inline-block;background:#eef;border-radius:4px;padding:0 .4rem;margin:.1rem .2rem .1rem 0;font-size:.85em}\
.dataset-year{color:#666;margin-left:.3rem}\
.no-data,.no-link,.no-info,.no-content{color:#888}\
.info-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(14rem,1fr));gap:.75rem}\
.info-label{font-weight:600;color:#555}\
.link-btn{margin-right:.5rem}";

fn page(title: &str, root: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"{root}index.html\">All datasets</a></nav>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

pub fn index_page(title: &str, view: &TableView) -> String {
    let rows = view.rows();
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", escape(title));
    let _ = writeln!(
        body,
        "<p id=\"dataset-count\"><strong>{}</strong> datasets</p>",
        rows.len()
    );
    body.push_str("<table id=\"datasets-table\">\n<thead><tr><th>Dataset</th><th>Links</th><th>Info</th></tr></thead>\n<tbody>\n");
    match view {
        TableView::NoResults => {
            let _ = writeln!(
                body,
                "<tr><td colspan=\"3\" class=\"no-data\">{NO_RESULTS}</td></tr>"
            );
        }
        TableView::Rows(rows) => {
            for row in rows {
                body.push_str(&table_row(row));
            }
        }
    }
    body.push_str("</tbody>\n</table>\n");
    page(title, "", &body)
}

fn table_row(row: &DisplayRow) -> String {
    let mut out = String::from("<tr>");

    out.push_str("<td class=\"dataset-name-cell\"><div class=\"dataset-name\">");
    let _ = write!(
        out,
        "<a href=\"{}\"><strong>{}</strong>",
        escape_attr(&row.detail_href),
        escape(&row.name)
    );
    if let Some(year) = &row.year {
        let _ = write!(out, "<span class=\"dataset-year\">({})</span>", escape(year));
    }
    out.push_str("</a></div><div class=\"dataset-meta\">");
    for badge in &row.badges {
        let _ = write!(
            out,
            "<span class=\"meta-tag\" title=\"{}\">{}</span>",
            badge.kind.title(),
            escape(&badge.text)
        );
    }
    out.push_str("</div></td>");

    out.push_str("<td class=\"dataset-links-cell\">");
    if row.links.is_empty() {
        let _ = write!(out, "<span class=\"no-link\">{NO_LINKS}</span>");
    }
    for link in &row.links {
        let _ = write!(
            out,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"link-btn\">{}</a>",
            escape_attr(&link.url),
            link.kind.title()
        );
    }
    out.push_str("</td>");

    out.push_str("<td class=\"dataset-info-cell\">");
    if row.info.is_empty() {
        let _ = write!(out, "<span class=\"no-info\">{NO_INFO}</span>");
    }
    for line in &row.info {
        match line.label {
            Some(label) => {
                let _ = write!(
                    out,
                    "<div class=\"info-row\"><strong>{label}:</strong> {}</div>",
                    escape(&line.text)
                );
            }
            None => {
                let _ = write!(
                    out,
                    "<div class=\"info-row description\">{}</div>",
                    escape(&line.text)
                );
            }
        }
    }
    out.push_str("</td></tr>\n");
    out
}

pub fn detail_page(site_title: &str, detail: &DatasetDetail, format: BodyFormat) -> String {
    let dataset = &detail.dataset;
    let mut body = String::new();

    let _ = write!(body, "<h1 id=\"dataset-name\">{}", escape(&dataset.name));
    if let Some(year) = &dataset.year {
        let _ = write!(body, " <span id=\"dataset-year\">({})</span>", escape(year));
    }
    body.push_str("</h1>\n<div id=\"dataset-meta-header\">");
    let header = [
        dataset.organs.as_deref(),
        dataset.staining.as_deref(),
        dataset.task.as_deref(),
        dataset.kind.as_deref(),
    ];
    for value in header.into_iter().flatten() {
        let _ = write!(body, "<span class=\"meta-badge\">{}</span>", escape(value));
    }
    body.push_str("</div>\n<section id=\"basic-info\">\n<h2>Basic information</h2>\n");
    if detail.basic_info.is_empty() {
        body.push_str("<p>No basic information</p>\n");
    } else {
        body.push_str("<div class=\"info-grid\">");
        for item in &detail.basic_info {
            let _ = write!(
                body,
                "<div class=\"info-item\"><div class=\"info-label\">{}</div><div class=\"info-value\">{}</div></div>",
                item.label,
                escape(&item.value)
            );
        }
        body.push_str("</div>\n");
    }
    body.push_str("</section>\n<section id=\"markdown-content\">\n<h2>Details</h2>\n");
    match detail.body_for(format) {
        Some(markdown) => body.push_str(&render_body_html(markdown, format)),
        None => body.push_str("<p class=\"no-content\">No detailed description</p>\n"),
    }
    body.push_str("</section>\n");

    let title = format!("{} - {site_title}", dataset.name);
    page(&title, "../", &body)
}
