use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use reqwest::Url;

use pathology_datasets::app::{App, ProgressEvent, ProgressSink, body_format, table_view};
use pathology_datasets::catalog::{CatalogClient, CatalogLocation, HttpResponse};
use pathology_datasets::detail::BodyFormat;
use pathology_datasets::domain::{DatasetId, TaskCategory};
use pathology_datasets::error::CatalogError;
use pathology_datasets::filter::Selection;
use pathology_datasets::output::JsonOutput;
use pathology_datasets::site::SiteOptions;

const BASE: &str = "https://data.example.org/catalog/";

const INDEX: &str = r#"[
    {"id": "monuseg", "name": "MoNuSeg", "year": 2018, "organs": "Multiple", "task": "seg"},
    {"id": "bach", "name": "BACH", "year": 2018, "organs": "Breast", "task": "classification"},
    {"id": "anhir", "name": "ANHIR", "year": 2019, "organs": "Lung", "task": "registration"}
]"#;

#[derive(Default)]
struct MockCatalog {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockCatalog {
    fn with(mut self, path: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            format!("{BASE}{path}"),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    fn count(&self, path: &str) -> usize {
        let url = format!("{BASE}{path}");
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| **request == url)
            .count()
    }
}

impl CatalogClient for MockCatalog {
    fn get(&self, url: &Url) -> Result<HttpResponse, CatalogError> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self
            .responses
            .get(url.as_str())
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                body: String::new(),
            }))
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event.message);
    }
}

fn app(client: MockCatalog) -> App<MockCatalog> {
    App::new(client, CatalogLocation::parse(BASE).unwrap())
}

#[test]
fn list_reports_total_and_filtered() {
    let app = app(MockCatalog::default().with("_datasets.json", 200, INDEX));
    let selection = Selection {
        year: Some("2018".to_string()),
        ..Selection::default()
    };
    let result = app.list(&selection, &JsonOutput).unwrap();
    assert_eq!(result.total, 3);
    assert_eq!(result.shown, 2);
    let ids: Vec<&str> = result.datasets.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["bach", "monuseg"]);
    assert_eq!(result.selection, selection);
}

#[test]
fn empty_catalog_is_an_error() {
    let app = app(MockCatalog::default().with("_datasets.json", 200, r#"[{"name": "no id"}]"#));
    assert_matches!(
        app.list(&Selection::default(), &JsonOutput),
        Err(CatalogError::EmptyCatalog(url)) if url.ends_with("_datasets.json")
    );
}

#[test]
fn http_failure_surfaces_from_list() {
    let app = app(MockCatalog::default().with("_datasets.json", 503, ""));
    assert_matches!(
        app.list(&Selection::default(), &JsonOutput),
        Err(CatalogError::Http { status: 503, .. })
    );
}

#[test]
fn progress_events_follow_phases() {
    let app = app(MockCatalog::default().with("_datasets.json", 200, INDEX));
    let sink = RecordingSink::default();
    app.catalog(&sink).unwrap();
    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("phase=Fetch;"));
    assert_eq!(events[1], "phase=Decorate; 3 datasets");
}

#[test]
fn facets_cover_loaded_catalog() {
    let app = app(MockCatalog::default().with("_datasets.json", 200, INDEX));
    let options = app.facets(&JsonOutput).unwrap();
    assert_eq!(options.organs, vec!["Breast", "Lung", "Multiple"]);
    assert_eq!(options.years, vec!["2019", "2018"]);
}

#[test]
fn table_view_reflects_selection() {
    let app = app(MockCatalog::default().with("_datasets.json", 200, INDEX));
    let catalog = app.catalog(&JsonOutput).unwrap();
    let selection = Selection {
        tasks: BTreeSet::from([TaskCategory::Registration]),
        ..Selection::default()
    };
    let view = table_view(&catalog, &selection);
    assert_eq!(view.rows().len(), 1);
    assert_eq!(view.rows()[0].id, "anhir");
}

#[test]
fn detail_goes_through_app() {
    let client = MockCatalog::default()
        .with("_datasets.json", 200, INDEX)
        .with("bach.md", 200, "# BACH\n\n![grid](grid.png)");
    let app = app(client);
    let id: DatasetId = "bach".parse().unwrap();
    let detail = app.detail(&id, &JsonOutput).unwrap();
    assert_eq!(detail.dataset.name, "BACH");
    assert!(
        detail
            .body
            .unwrap()
            .contains("https://data.example.org/catalog/bach/img/grid.png")
    );
}

#[test]
fn render_site_writes_pages_with_one_index_fetch() {
    let temp = tempfile::tempdir().unwrap();
    let out_dir = Utf8PathBuf::from_path_buf(temp.path().join("site")).unwrap();
    let client = MockCatalog::default()
        .with("_datasets.json", 200, INDEX)
        .with("monuseg.md", 200, "Nuclei from many organs.");
    let app = app(client);
    let options = SiteOptions {
        title: "Pathology Datasets".to_string(),
        body_format: body_format(true),
    };
    let selection = Selection {
        year: Some("2018".to_string()),
        ..Selection::default()
    };

    let result = app
        .render_site(&selection, &out_dir, &options, &JsonOutput)
        .unwrap();
    assert_eq!(result.datasets, 2);
    assert_eq!(result.details.len(), 2);
    assert!(out_dir.join("index.html").exists());
    assert!(out_dir.join("detail/bach.html").exists());
    assert!(out_dir.join("detail/monuseg.html").exists());
    assert!(!out_dir.join("detail/anhir.html").exists());

    let client = app.client();
    assert_eq!(client.count("_datasets.json"), 1);
    assert_eq!(client.count("bach.md"), 1);
}

#[test]
fn render_site_skips_ids_unusable_as_file_names() {
    let temp = tempfile::tempdir().unwrap();
    let out_dir = Utf8PathBuf::from_path_buf(temp.path().join("site")).unwrap();
    let body = r#"[
        {"id": "kumar..v2", "name": "Kumar v2"},
        {"id": " padded", "name": "Padded"},
        {"id": "glas", "name": "GlaS"}
    ]"#;
    let app = app(MockCatalog::default().with("_datasets.json", 200, body));
    let options = SiteOptions {
        title: "Pathology Datasets".to_string(),
        body_format: body_format(true),
    };

    let listed = app.list(&Selection::default(), &JsonOutput).unwrap();
    assert_eq!(listed.total, 3);

    let result = app
        .render_site(&Selection::default(), &out_dir, &options, &JsonOutput)
        .unwrap();
    assert_eq!(result.datasets, 3);
    assert_eq!(result.details.len(), 2);
    assert_eq!(result.skipped, vec![" padded".to_string()]);
    assert!(out_dir.join("detail/kumar..v2.html").exists());
    assert!(out_dir.join("detail/glas.html").exists());
}

#[test]
fn body_format_follows_flag() {
    assert_eq!(body_format(true), BodyFormat::Markdown);
    assert_eq!(body_format(false), BodyFormat::Preformatted);
}
