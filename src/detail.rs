use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, html};
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{CatalogClient, CatalogLocation, entry_id, fetch_index, read_record};
use crate::domain::{Dataset, DatasetId, DatasetRecord};
use crate::error::CatalogError;
use crate::html::escape;
use crate::normalize::decorate;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid image regex"));
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoItem {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetDetail {
    pub dataset: Dataset,
    pub basic_info: Vec<InfoItem>,
    /// Markdown with image paths already rewritten; `None` when the dataset
    /// has no description file.
    pub body: Option<String>,
    /// The description exactly as fetched, shown when Markdown rendering is off.
    #[serde(skip)]
    pub raw_body: Option<String>,
}

impl DatasetDetail {
    /// Body text to render in `format`.
    pub fn body_for(&self, format: BodyFormat) -> Option<&str> {
        match format {
            BodyFormat::Markdown => self.body.as_deref(),
            BodyFormat::Preformatted => self.raw_body.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Markdown,
    Preformatted,
}

pub fn load_detail<C: CatalogClient + ?Sized>(
    client: &C,
    location: &CatalogLocation,
    id: &DatasetId,
) -> Result<DatasetDetail, CatalogError> {
    let entries = fetch_index(client, location)?;
    detail_from_entries(client, location, &entries, id)
}

/// Builds the detail of `id` from an already fetched index; only the
/// Markdown body is requested.
pub fn detail_from_entries<C: CatalogClient + ?Sized>(
    client: &C,
    location: &CatalogLocation,
    entries: &[Value],
    id: &DatasetId,
) -> Result<DatasetDetail, CatalogError> {
    let entry = entries
        .iter()
        .find(|entry| entry_id(entry) == Some(id.as_str()))
        .cloned()
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    let record = read_record(entry)?;
    let basic_info = basic_info(&record);
    let dataset = decorate(record)
        .ok_or_else(|| CatalogError::Format(format!("dataset {id} has no id")))?;

    let raw_body = fetch_markdown(client, location, id);
    let body = raw_body
        .as_deref()
        .map(|markdown| rewrite_image_paths(markdown, &location.image_base(id.as_str())));

    Ok(DatasetDetail {
        dataset,
        basic_info,
        body,
        raw_body,
    })
}

/// Best-effort fetch of `<id>.md`. A missing file, any other status and any
/// transport failure all yield `None`.
pub fn fetch_markdown<C: CatalogClient + ?Sized>(
    client: &C,
    location: &CatalogLocation,
    id: &DatasetId,
) -> Option<String> {
    let url = location.markdown_url(id);
    match client.get(&url) {
        Ok(response) if response.is_success() => {
            Some(response.body).filter(|body| !body.trim().is_empty())
        }
        Ok(response) if response.status == 404 => {
            tracing::debug!(%url, "no markdown description");
            None
        }
        Ok(response) => {
            tracing::warn!(%url, status = response.status, "markdown description unavailable");
            None
        }
        Err(err) => {
            tracing::warn!(%url, error = %err, "markdown description unavailable");
            None
        }
    }
}

/// Points relative image sources at `image_base`. Sources with a scheme,
/// protocol-relative sources and root-relative sources are left alone.
pub fn rewrite_image_paths(markdown: &str, image_base: &str) -> String {
    IMAGE_RE
        .replace_all(markdown, |caps: &Captures| {
            let alt = &caps[1];
            let src = &caps[2];
            if is_absolute_source(src) {
                caps[0].to_string()
            } else {
                format!("![{alt}]({image_base}{src})")
            }
        })
        .into_owned()
}

pub fn is_absolute_source(src: &str) -> bool {
    src.starts_with('/') || SCHEME_RE.is_match(src)
}

pub fn basic_info(record: &DatasetRecord) -> Vec<InfoItem> {
    [
        ("Year", record.year.clone()),
        ("Organs", record.organs.clone()),
        ("Staining", record.staining.clone()),
        ("Task", record.task.as_ref().map(|task| task.join(", "))),
        ("Size", record.size.clone()),
        ("Data format", record.data.clone()),
        ("Data type", record.kind.clone()),
        ("Other", record.other.clone()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|value| InfoItem { label, value }))
    .collect()
}

/// Renders a description body as HTML. Single newlines become line breaks.
pub fn render_body_html(markdown: &str, format: BodyFormat) -> String {
    match format {
        BodyFormat::Markdown => {
            let mut options = Options::empty();
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);
            let parser = Parser::new_ext(markdown, options).map(|event| match event {
                Event::SoftBreak => Event::HardBreak,
                other => other,
            });
            let mut out = String::with_capacity(markdown.len() * 3 / 2);
            html::push_html(&mut out, parser);
            out
        }
        BodyFormat::Preformatted => {
            format!("<pre class=\"markdown-raw\">{}</pre>", escape(markdown))
        }
    }
}
