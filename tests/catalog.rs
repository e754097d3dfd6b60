use std::collections::HashMap;
use std::sync::Mutex;

use assert_matches::assert_matches;
use reqwest::Url;

use pathology_datasets::catalog::{
    Catalog, CatalogClient, CatalogLocation, HttpResponse, decorate_entries, fetch_index,
    parse_index,
};
use pathology_datasets::domain::{Structure, TaskCategory};
use pathology_datasets::error::CatalogError;

const BASE: &str = "https://data.example.org/catalog/";

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

fn location() -> CatalogLocation {
    CatalogLocation::parse(BASE).unwrap()
}

fn load(client: &MockCatalog) -> Result<Catalog, CatalogError> {
    let entries = fetch_index(client, &location())?;
    Ok(Catalog::new(decorate_entries(entries)?))
}

#[test]
fn location_from_directory_url() {
    let location = CatalogLocation::parse("https://data.example.org/catalog").unwrap();
    assert_eq!(location.base().as_str(), BASE);
    assert_eq!(
        location.index_url().as_str(),
        "https://data.example.org/catalog/_datasets.json"
    );
    assert_eq!(
        location.markdown_url(&"monuseg".parse().unwrap()).as_str(),
        "https://data.example.org/catalog/monuseg.md"
    );
    assert_eq!(
        location.image_base("monuseg"),
        "https://data.example.org/catalog/monuseg/img/"
    );
}

#[test]
fn location_from_index_url() {
    let location =
        CatalogLocation::parse("https://data.example.org/catalog/list.json?v=2").unwrap();
    assert_eq!(location.base().as_str(), BASE);
    assert_eq!(
        location.index_url().as_str(),
        "https://data.example.org/catalog/list.json"
    );
}

#[test]
fn local_origins_are_refused() {
    for value in [
        "/srv/catalog",
        "./catalog",
        "file:///srv/catalog/_datasets.json",
        "C:\\catalog",
    ] {
        assert_matches!(
            CatalogLocation::parse(value),
            Err(CatalogError::LocalOrigin(_)),
            "{value}"
        );
    }
    assert_matches!(
        CatalogLocation::parse("ftp://data.example.org/catalog/"),
        Err(CatalogError::InvalidUrl(_))
    );
}

#[test]
fn server_error_carries_status_and_url() {
    let client = MockCatalog::default().with("_datasets.json", 500, "boom");
    let err = load(&client).unwrap_err();
    assert_matches!(
        &err,
        CatalogError::Http { status: 500, url } if url.ends_with("_datasets.json")
    );
    assert!(err.to_string().contains("500"));
}

#[test]
fn non_array_index_is_a_format_error() {
    let client = MockCatalog::default().with("_datasets.json", 200, r#"{"datasets": []}"#);
    assert_matches!(load(&client), Err(CatalogError::Format(_)));
    assert_matches!(parse_index("not json"), Err(CatalogError::Format(_)));
}

#[test]
fn odd_field_shapes_do_not_fail_the_catalog() {
    let body = r#"[
        {"id": "a", "name": "Alpha", "size": 30, "organs": ["Breast", "Lung"],
         "structure": "cell", "description": "nuclei"},
        {"id": "b", "name": "Beta", "organs": "Breast", "links": {"data": "", "paper": "https://p"}}
    ]"#;
    let client = MockCatalog::default().with("_datasets.json", 200, body);
    let catalog = load(&client).unwrap();
    assert_eq!(catalog.len(), 2);

    let alpha = catalog.get("a").unwrap();
    assert_eq!(alpha.size.as_deref(), Some("30"));
    assert_eq!(alpha.organs, None);
    assert_eq!(alpha.structure_canonical, vec![Structure::Cell]);

    let beta = catalog.get("b").unwrap();
    assert_eq!(beta.organs_canonical, "Breast");
    assert_eq!(beta.links.data, None);
    assert_eq!(beta.links.paper.as_deref(), Some("https://p"));
}

#[test]
fn entries_without_id_are_dropped() {
    let body = r#"[
        {"id": "b", "name": "beta"},
        {"name": "no id"},
        {"id": "", "name": "empty id"},
        {"id": 7, "name": "numeric id"},
        {"id": "a", "name": "Alpha"}
    ]"#;
    let client = MockCatalog::default().with("_datasets.json", 200, body);
    let catalog = load(&client).unwrap();
    let ids: Vec<&str> = catalog.datasets().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(client.requests.lock().unwrap().len(), 1);
}

#[test]
fn names_sort_case_insensitively_with_transliteration() {
    let body = r#"[
        {"id": "z", "name": "Zeta"},
        {"id": "r", "name": "乳腺"},
        {"id": "b", "name": "beta"},
        {"id": "u", "name": "Ärzte"},
        {"id": "a", "name": "Alpha"}
    ]"#;
    let client = MockCatalog::default().with("_datasets.json", 200, body);
    let catalog = load(&client).unwrap();
    let names: Vec<&str> = catalog.datasets().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Ärzte", "beta", "乳腺", "Zeta"]);
}

#[test]
fn single_record_catalog_is_decorated() {
    let body = r#"[{"id":"a","name":"Zeta","organs":"Colon adenocarcinoma","task":"seg"}]"#;
    let client = MockCatalog::default().with("_datasets.json", 200, body);
    let catalog = load(&client).unwrap();
    let dataset = catalog.get("a").unwrap();
    assert_eq!(dataset.organs_canonical, "Colon");
    assert_eq!(dataset.tasks_canonical, vec![TaskCategory::Segmentation]);
    assert!(catalog.get("missing").is_none());
}

#[test]
fn numeric_years_and_empty_strings() {
    let body = r#"[
        {"id": "a", "name": "A", "year": 2021, "size": ""},
        {"id": "b", "name": "B", "year": 0},
        {"id": "c", "name": "C", "year": "2019"}
    ]"#;
    let client = MockCatalog::default().with("_datasets.json", 200, body);
    let catalog = load(&client).unwrap();
    assert_eq!(catalog.get("a").unwrap().year.as_deref(), Some("2021"));
    assert_eq!(catalog.get("a").unwrap().size, None);
    assert_eq!(catalog.get("b").unwrap().year, None);
    assert_eq!(catalog.get("c").unwrap().year.as_deref(), Some("2019"));
}
