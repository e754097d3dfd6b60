use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogLocation, DEFAULT_TIMEOUT_MS};
use crate::error::CatalogError;

pub const CONFIG_FILE: &str = "pathds.json";
pub const DEFAULT_SITE_TITLE: &str = "Pathology Datasets";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub site_title: Option<String>,
    #[serde(default)]
    pub render_markdown: Option<bool>,
}

/// Values given on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub location: CatalogLocation,
    pub timeout: Duration,
    pub site_title: String,
    pub render_markdown: bool,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path` when given (it must exist), otherwise the first of
    /// `./pathds.json` and the user config file that exists. Having no file at
    /// all is fine as long as the overrides name a catalog.
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, CatalogError> {
        let config = match path {
            Some(path) => Self::read(PathBuf::from(path))?,
            None => match Self::default_paths().into_iter().find(|path| path.exists()) {
                Some(path) => Self::read(path)?,
                None => Config::default(),
            },
        };
        Self::resolve_config(config, overrides)
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, CatalogError> {
        let catalog_url = overrides
            .catalog_url
            .or(config.catalog_url)
            .ok_or(CatalogError::MissingCatalog)?;
        let location = CatalogLocation::parse(&catalog_url)?;
        let timeout_ms = overrides
            .timeout_ms
            .or(config.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Ok(ResolvedConfig {
            schema_version: config.schema_version.unwrap_or(1),
            location,
            timeout: Duration::from_millis(timeout_ms),
            site_title: config
                .site_title
                .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string()),
            render_markdown: config.render_markdown.unwrap_or(true),
        })
    }

    fn read(path: PathBuf) -> Result<Config, CatalogError> {
        tracing::debug!(path = %path.display(), "reading config");
        let content =
            fs::read_to_string(&path).map_err(|_| CatalogError::ConfigRead(path.clone()))?;
        serde_json::from_str(&content).map_err(|err| CatalogError::ConfigParse(err.to_string()))
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dirs) = ProjectDirs::from("", "", "pathology-datasets") {
            paths.push(dirs.config_dir().join(CONFIG_FILE));
        }
        paths
    }
}
