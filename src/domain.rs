use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Structure {
    Cell,
    Tissue,
}

impl Structure {
    pub const ALL: [Structure; 2] = [Structure::Cell, Structure::Tissue];

    pub fn label(self) -> &'static str {
        match self {
            Structure::Cell => "Cell",
            Structure::Tissue => "Tissue",
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canonical task categories. Declaration order is the display and sort
/// precedence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum TaskCategory {
    Detection,
    Segmentation,
    Classification,
    Registration,
    Other,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 5] = [
        TaskCategory::Detection,
        TaskCategory::Segmentation,
        TaskCategory::Classification,
        TaskCategory::Registration,
        TaskCategory::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TaskCategory::Detection => "Detection",
            TaskCategory::Segmentation => "Segmentation",
            TaskCategory::Classification => "Classification",
            TaskCategory::Registration => "Registration",
            TaskCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Dataset identifier supplied by a user (CLI argument or detail-page URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the `id` query parameter of a detail-page URL such as
    /// `https://host/dataset-detail.html?id=monuseg`.
    pub fn from_page_url(page_url: &str) -> Result<Self, CatalogError> {
        let url = Url::parse(page_url)
            .map_err(|err| CatalogError::InvalidUrl(format!("{page_url}: {err}")))?;
        let id = url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| CatalogError::MissingParameter("id".to_string()))?;
        id.parse()
    }

    /// Validates an id exactly as it appears in the catalog. Unlike
    /// [`FromStr`], surrounding whitespace is refused rather than trimmed so
    /// the id still matches its catalog entry.
    pub fn from_catalog(raw: &str) -> Result<Self, CatalogError> {
        if raw.is_empty() {
            return Err(CatalogError::MissingParameter("id".to_string()));
        }
        if raw.trim() != raw || escapes_directory(raw) {
            return Err(CatalogError::InvalidDatasetId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An id is used as a file name, so separators and the `.`/`..` entries are
/// refused. Dots inside a name (`kumar..v2`) are fine.
fn escapes_directory(id: &str) -> bool {
    id.contains('/') || id.contains('\\') || id == "." || id == ".."
}

impl FromStr for DatasetId {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::MissingParameter("id".to_string()));
        }
        if escapes_directory(trimmed) {
            return Err(CatalogError::InvalidDatasetId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Raw `task` value: a single string (possibly `+`/`,`/`|` separated) or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawTask {
    One(String),
    Many(Vec<String>),
}

impl RawTask {
    pub fn join(&self, separator: &str) -> String {
        match self {
            RawTask::One(value) => value.clone(),
            RawTask::Many(values) => values.join(separator),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub paper: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub github: Option<String>,
}

impl Links {
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.paper.is_none() && self.github.is_none()
    }
}

/// One entry of `_datasets.json`, as published. Fields of an unexpected
/// shape are read leniently: scalars become their display text, anything
/// else counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_year")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub organs: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub staining: Option<String>,
    #[serde(default, deserialize_with = "de_task")]
    pub task: Option<RawTask>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub data: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "de_opt_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub other: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_links")]
    pub links: Option<Links>,
    #[serde(default, deserialize_with = "de_structure")]
    pub structure: Option<Vec<String>>,
}

/// A catalog record decorated with its canonical fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staining: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    pub tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Links::is_empty")]
    pub links: Links,
    pub organs_canonical: String,
    pub staining_canonical: String,
    pub structure_canonical: Vec<Structure>,
    pub tasks_canonical: Vec<TaskCategory>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
    .filter(|text| !text.is_empty())
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(scalar_text))
}

fn de_task<'de, D>(deserializer: D) -> Result<Option<RawTask>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(RawTask::Many(
            items.into_iter().filter_map(scalar_text).collect(),
        )),
        Some(other) => scalar_text(other).map(RawTask::One),
        None => None,
    })
}

/// Only a list is an explicit structure; any other shape falls back to
/// inference.
fn de_structure<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items.into_iter().filter_map(scalar_text).collect()),
        _ => None,
    })
}

fn de_links<'de, D>(deserializer: D) -> Result<Option<Links>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn de_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    })
}
