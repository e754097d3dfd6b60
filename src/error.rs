use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("catalog format error: {0}")]
    Format(String),

    #[error("catalog request failed with status {status}: {url}")]
    Http { status: u16, url: String },

    #[error("catalog request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("dataset not found: {0}")]
    NotFound(String),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid dataset id: {0}")]
    InvalidDatasetId(String),

    #[error("refusing to load the catalog from a local path: {0}")]
    #[diagnostic(help(
        "serve the catalog directory over HTTP (for example `python3 -m http.server`) and pass its http:// URL"
    ))]
    LocalOrigin(String),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),

    #[error("no datasets were loaded from {0}")]
    EmptyCatalog(String),

    #[error("no catalog URL configured (pass --catalog or set catalog_url in pathds.json)")]
    MissingCatalog,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
