use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::domain::Dataset;

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Organ,
    Structure,
    Task,
    Staining,
}

impl BadgeKind {
    pub fn title(self) -> &'static str {
        match self {
            BadgeKind::Organ => "Organ",
            BadgeKind::Structure => "Structure",
            BadgeKind::Task => "Task",
            BadgeKind::Staining => "Staining",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Data,
    Paper,
    Github,
}

impl LinkKind {
    pub fn title(self) -> &'static str {
        match self {
            LinkKind::Data => "Data",
            LinkKind::Paper => "Paper",
            LinkKind::Github => "GitHub",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    pub kind: LinkKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoLine {
    /// `None` for the free-text description line.
    pub label: Option<&'static str>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub id: String,
    pub name: String,
    pub year: Option<String>,
    pub detail_href: String,
    pub badges: Vec<Badge>,
    pub links: Vec<ExternalLink>,
    pub info: Vec<InfoLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum TableView {
    Rows(Vec<DisplayRow>),
    NoResults,
}

impl TableView {
    pub fn rows(&self) -> &[DisplayRow] {
        match self {
            TableView::Rows(rows) => rows,
            TableView::NoResults => &[],
        }
    }
}

pub const NO_RESULTS: &str = "No matching datasets";
pub const NO_LINKS: &str = "No links";
pub const NO_INFO: &str = "No info";

pub fn render_rows(filtered: &[&Dataset]) -> TableView {
    if filtered.is_empty() {
        return TableView::NoResults;
    }
    TableView::Rows(filtered.iter().map(|dataset| display_row(dataset)).collect())
}

pub fn detail_href(id: &str) -> String {
    format!("detail/{}.html", utf8_percent_encode(id, PATH_SEGMENT))
}

pub fn display_row(dataset: &Dataset) -> DisplayRow {
    let mut badges = Vec::new();
    if !dataset.organs_canonical.is_empty() {
        badges.push(Badge {
            kind: BadgeKind::Organ,
            text: dataset.organs_canonical.clone(),
        });
    }
    if !dataset.structure_canonical.is_empty() {
        badges.push(Badge {
            kind: BadgeKind::Structure,
            text: join_labels(dataset.structure_canonical.iter().map(|s| s.label())),
        });
    }
    if !dataset.tasks_canonical.is_empty() {
        badges.push(Badge {
            kind: BadgeKind::Task,
            text: join_labels(dataset.tasks_canonical.iter().map(|t| t.label())),
        });
    }
    if !dataset.staining_canonical.is_empty() {
        badges.push(Badge {
            kind: BadgeKind::Staining,
            text: dataset.staining_canonical.clone(),
        });
    }

    let links = [
        (LinkKind::Data, &dataset.links.data),
        (LinkKind::Paper, &dataset.links.paper),
        (LinkKind::Github, &dataset.links.github),
    ]
    .into_iter()
    .filter_map(|(kind, url)| {
        url.as_ref().map(|url| ExternalLink {
            kind,
            url: url.clone(),
        })
    })
    .collect();

    let info = [
        (Some("Size"), &dataset.size),
        (Some("Data"), &dataset.data),
        (Some("Type"), &dataset.kind),
        (Some("Other"), &dataset.other),
        (None, &dataset.description),
    ]
    .into_iter()
    .filter_map(|(label, text)| {
        text.as_ref().map(|text| InfoLine {
            label,
            text: text.clone(),
        })
    })
    .collect();

    DisplayRow {
        id: dataset.id.clone(),
        name: dataset.name.clone(),
        year: dataset.year.clone(),
        detail_href: detail_href(&dataset.id),
        badges,
        links,
        info,
    }
}

fn join_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(" + ")
}
