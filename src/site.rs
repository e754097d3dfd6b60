use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::detail::{BodyFormat, DatasetDetail};
use crate::domain::DatasetId;
use crate::error::CatalogError;
use crate::html::{detail_page, index_page};
use crate::table::TableView;

#[derive(Debug, Clone, Serialize)]
pub struct RenderResult {
    pub out_dir: String,
    pub index: String,
    pub details: Vec<String>,
    /// Ids whose detail page was not written.
    pub skipped: Vec<String>,
    pub datasets: usize,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct SiteOptions {
    pub title: String,
    pub body_format: BodyFormat,
}

/// Writes `index.html` for `view` and one page per entry of `details` under
/// `out_dir`. Existing files are replaced atomically. Details whose id cannot
/// be used as a file name are skipped.
pub fn write_site(
    out_dir: &Utf8Path,
    view: &TableView,
    details: &[DatasetDetail],
    options: &SiteOptions,
) -> Result<RenderResult, CatalogError> {
    let index_path = out_dir.join("index.html");
    write_atomic(&index_path, index_page(&options.title, view).as_bytes())?;

    let mut written = Vec::with_capacity(details.len());
    let mut skipped = Vec::new();
    for detail in details {
        let id = match DatasetId::from_catalog(&detail.dataset.id) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(id = %detail.dataset.id, error = %err, "skipping detail page");
                skipped.push(detail.dataset.id.clone());
                continue;
            }
        };
        let path = detail_path(out_dir, &id);
        let html = detail_page(&options.title, detail, options.body_format);
        write_atomic(&path, html.as_bytes())?;
        tracing::debug!(%path, "wrote detail page");
        written.push(path.to_string());
    }

    Ok(RenderResult {
        out_dir: out_dir.to_string(),
        index: index_path.to_string(),
        details: written,
        skipped,
        datasets: view.rows().len(),
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// On-disk location of the page that [`crate::table::detail_href`] links to. The href is
/// percent-encoded, the file name is not.
pub fn detail_path(out_dir: &Utf8Path, id: &DatasetId) -> Utf8PathBuf {
    out_dir.join("detail").join(format!("{}.html", id.as_str()))
}

fn write_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), CatalogError> {
    let parent = path
        .parent()
        .ok_or_else(|| CatalogError::Filesystem(format!("invalid output path {path}")))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| CatalogError::Filesystem(format!("create {parent}: {err}")))?;
    let mut temp = NamedTempFile::new_in(parent.as_std_path())
        .map_err(|err| CatalogError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| CatalogError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| CatalogError::Filesystem(format!("write {path}: {err}")))?;
    Ok(())
}
