use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Catalog, CatalogClient, CatalogLocation, decorate_entries, fetch_index};
use crate::detail::{BodyFormat, DatasetDetail, detail_from_entries, load_detail};
use crate::domain::{Dataset, DatasetId};
use crate::error::CatalogError;
use crate::filter::{FilterOptions, Selection, apply_filters};
use crate::site::{RenderResult, SiteOptions, write_site};
use crate::table::{TableView, render_rows};

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub total: usize,
    pub shown: usize,
    pub selection: Selection,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: CatalogClient> {
    client: C,
    location: CatalogLocation,
}

impl<C: CatalogClient> App<C> {
    pub fn new(client: C, location: CatalogLocation) -> Self {
        Self { client, location }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn location(&self) -> &CatalogLocation {
        &self.location
    }

    /// Loads the catalog once; an index without any usable dataset is an
    /// error for every command built on top of the list.
    pub fn catalog(&self, sink: &dyn ProgressSink) -> Result<Catalog, CatalogError> {
        self.load(sink).map(|(_, catalog)| catalog)
    }

    fn load(&self, sink: &dyn ProgressSink) -> Result<(Vec<Value>, Catalog), CatalogError> {
        let index_url = self.location.index_url();
        sink.event(ProgressEvent {
            message: format!("phase=Fetch; loading {index_url}"),
            elapsed: None,
        });
        let started = Instant::now();
        let entries = fetch_index(&self.client, &self.location)?;
        let catalog = Catalog::new(decorate_entries(entries.clone())?);
        tracing::info!(
            entries = entries.len(),
            datasets = catalog.len(),
            url = %index_url,
            "catalog loaded"
        );
        sink.event(ProgressEvent {
            message: format!("phase=Decorate; {} datasets", catalog.len()),
            elapsed: Some(started.elapsed()),
        });
        if catalog.is_empty() {
            return Err(CatalogError::EmptyCatalog(index_url.to_string()));
        }
        Ok((entries, catalog))
    }

    pub fn list(
        &self,
        selection: &Selection,
        sink: &dyn ProgressSink,
    ) -> Result<ListResult, CatalogError> {
        let catalog = self.catalog(sink)?;
        Ok(list_result(&catalog, selection))
    }

    pub fn facets(&self, sink: &dyn ProgressSink) -> Result<FilterOptions, CatalogError> {
        let catalog = self.catalog(sink)?;
        Ok(FilterOptions::from_datasets(catalog.datasets()))
    }

    pub fn detail(
        &self,
        id: &DatasetId,
        sink: &dyn ProgressSink,
    ) -> Result<DatasetDetail, CatalogError> {
        sink.event(ProgressEvent {
            message: format!("phase=Fetch; looking up {id}"),
            elapsed: None,
        });
        let started = Instant::now();
        let detail = load_detail(&self.client, &self.location, id)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Detail; {} ({})",
                detail.dataset.name,
                if detail.body.is_some() {
                    "with description"
                } else {
                    "no description"
                }
            ),
            elapsed: Some(started.elapsed()),
        });
        Ok(detail)
    }

    /// Writes the index page for `selection` plus a detail page for every
    /// listed dataset.
    pub fn render_site(
        &self,
        selection: &Selection,
        out_dir: &Utf8Path,
        options: &SiteOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RenderResult, CatalogError> {
        let (entries, catalog) = self.load(sink)?;
        let filtered = apply_filters(catalog.datasets(), selection);
        let view = render_rows(&filtered);

        let mut details = Vec::with_capacity(filtered.len());
        let mut skipped = Vec::new();
        for dataset in &filtered {
            let detail = DatasetId::from_catalog(&dataset.id).and_then(|id| {
                detail_from_entries(&self.client, &self.location, &entries, &id)
            });
            match detail {
                Ok(detail) => details.push(detail),
                Err(err) => {
                    tracing::warn!(id = %dataset.id, error = %err, "skipping detail page");
                    skipped.push(dataset.id.clone());
                }
            }
        }

        sink.event(ProgressEvent {
            message: format!("phase=Write; {} pages into {out_dir}", details.len() + 1),
            elapsed: None,
        });
        let mut result = write_site(out_dir, &view, &details, options)?;
        skipped.append(&mut result.skipped);
        result.skipped = skipped;
        Ok(result)
    }
}

pub fn list_result(catalog: &Catalog, selection: &Selection) -> ListResult {
    let filtered = apply_filters(catalog.datasets(), selection);
    ListResult {
        total: catalog.len(),
        shown: filtered.len(),
        selection: selection.clone(),
        datasets: filtered.into_iter().cloned().collect(),
    }
}

pub fn table_view(catalog: &Catalog, selection: &Selection) -> TableView {
    render_rows(&apply_filters(catalog.datasets(), selection))
}

pub fn body_format(render_markdown: bool) -> BodyFormat {
    if render_markdown {
        BodyFormat::Markdown
    } else {
        BodyFormat::Preformatted
    }
}
