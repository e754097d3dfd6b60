use std::cmp::Ordering;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::domain::{Dataset, DatasetId, DatasetRecord};
use crate::error::CatalogError;
use crate::normalize::decorate;

pub const DEFAULT_INDEX_FILE: &str = "_datasets.json";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Where the catalog lives: the directory holding `_datasets.json`, the
/// per-dataset Markdown files and their image folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLocation {
    base: Url,
    index_file: String,
}

impl CatalogLocation {
    /// Accepts either the catalog directory or the index file URL. Local
    /// paths and `file:` URLs are rejected before anything is fetched.
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        let trimmed = value.trim();
        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Err(CatalogError::LocalOrigin(trimmed.to_string()));
            }
            Err(err) => return Err(CatalogError::InvalidUrl(format!("{trimmed}: {err}"))),
        };
        match url.scheme() {
            "http" | "https" => {}
            "file" => return Err(CatalogError::LocalOrigin(trimmed.to_string())),
            // Windows drive letters parse as one-letter schemes.
            scheme if scheme.len() == 1 => {
                return Err(CatalogError::LocalOrigin(trimmed.to_string()));
            }
            scheme => {
                return Err(CatalogError::InvalidUrl(format!(
                    "{trimmed}: unsupported scheme {scheme}"
                )));
            }
        }

        if url.path().ends_with(".json") {
            let index_file = url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or(DEFAULT_INDEX_FILE)
                .to_string();
            let base = url
                .join("./")
                .map_err(|err| CatalogError::InvalidUrl(format!("{trimmed}: {err}")))?;
            return Ok(Self { base, index_file });
        }

        let mut base = url;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            index_file: DEFAULT_INDEX_FILE.to_string(),
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn index_url(&self) -> Url {
        self.join(&self.index_file)
    }

    pub fn markdown_url(&self, id: &DatasetId) -> Url {
        self.join(&format!("{}.md", id.as_str()))
    }

    /// Directory that relative image references of a dataset resolve against.
    pub fn image_base(&self, id: &str) -> String {
        format!("{}{}/img/", self.base, id)
    }

    fn join(&self, relative: &str) -> Url {
        // A plain file name never fails to join onto an http(s) directory URL.
        self.base.join(relative).unwrap_or_else(|_| self.base.clone())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait CatalogClient: Send + Sync {
    fn get(&self, url: &Url) -> Result<HttpResponse, CatalogError>;
}

#[derive(Clone)]
pub struct CatalogHttpClient {
    client: Client,
    timeout: Duration,
}

impl CatalogHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("pathds/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| CatalogError::Transport(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| CatalogError::Transport(err.to_string()))?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            CatalogError::Transport(err.to_string())
        }
    }
}

impl CatalogClient for CatalogHttpClient {
    fn get(&self, url: &Url) -> Result<HttpResponse, CatalogError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|err| self.map_error(err))?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|err| self.map_error(err))?;
        Ok(HttpResponse { status, body })
    }
}

/// The decorated, name-sorted catalog held for one session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    datasets: Vec<Dataset>,
}

impl Catalog {
    pub fn new(mut datasets: Vec<Dataset>) -> Self {
        datasets.sort_by(|a, b| compare_names(&a.name, &b.name));
        Self { datasets }
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Dataset> {
        self.datasets.iter().find(|dataset| dataset.id == id)
    }
}

/// Fetches the index and checks that its top level is an array.
pub fn fetch_index<C: CatalogClient + ?Sized>(
    client: &C,
    location: &CatalogLocation,
) -> Result<Vec<Value>, CatalogError> {
    let url = location.index_url();
    let response = client.get(&url)?;
    if !response.is_success() {
        return Err(CatalogError::Http {
            status: response.status,
            url: url.to_string(),
        });
    }
    parse_index(&response.body)
}

pub fn parse_index(body: &str) -> Result<Vec<Value>, CatalogError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| CatalogError::Format(format!("index is not valid JSON: {err}")))?;
    match value {
        Value::Array(entries) => Ok(entries),
        _ => Err(CatalogError::Format(
            "index top level must be an array".to_string(),
        )),
    }
}

/// Id of an index entry, when it has a usable one.
pub fn entry_id(entry: &Value) -> Option<&str> {
    entry
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

pub fn read_record(entry: Value) -> Result<DatasetRecord, CatalogError> {
    let id = entry_id(&entry).unwrap_or_default().to_string();
    serde_json::from_value(entry)
        .map_err(|err| CatalogError::Format(format!("dataset {id}: {err}")))
}

/// Decorates every entry that carries an id; entries without one are skipped.
pub fn decorate_entries(entries: Vec<Value>) -> Result<Vec<Dataset>, CatalogError> {
    let mut datasets = Vec::with_capacity(entries.len());
    for entry in entries {
        if entry_id(&entry).is_none() {
            tracing::debug!("skipping catalog entry without id");
            continue;
        }
        if let Some(dataset) = decorate(read_record(entry)?) {
            datasets.push(dataset);
        }
    }
    Ok(datasets)
}

/// Case-insensitive name ordering. Names are compared on a transliterated key
/// first so that Han characters sort by their romanization next to Latin
/// names, then on the lowercase and raw names for a total order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let lower_a = a.to_lowercase();
    let lower_b = b.to_lowercase();
    collation_key(&lower_a)
        .cmp(&collation_key(&lower_b))
        .then_with(|| lower_a.cmp(&lower_b))
        .then_with(|| a.cmp(b))
}

pub fn collation_key(lower: &str) -> String {
    deunicode::deunicode(lower).to_lowercase()
}
