use std::fs;

use camino::Utf8PathBuf;

use pathology_datasets::detail::{BodyFormat, DatasetDetail, InfoItem};
use pathology_datasets::domain::{Dataset, DatasetId, DatasetRecord};
use pathology_datasets::normalize::decorate;
use pathology_datasets::site::{SiteOptions, detail_path, write_site};
use pathology_datasets::table::{NO_RESULTS, TableView, render_rows};

fn dataset(id: &str, name: &str) -> Dataset {
    decorate(DatasetRecord {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        organs: Some("Breast".to_string()),
        ..DatasetRecord::default()
    })
    .unwrap()
}

fn detail(dataset: Dataset, body: Option<&str>) -> DatasetDetail {
    DatasetDetail {
        dataset,
        basic_info: vec![InfoItem {
            label: "Organs",
            value: "Breast".to_string(),
        }],
        body: body.map(str::to_string),
        raw_body: body.map(str::to_string),
    }
}

fn options() -> SiteOptions {
    SiteOptions {
        title: "Pathology Datasets".to_string(),
        body_format: BodyFormat::Markdown,
    }
}

fn out_dir(temp: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().join("site")).unwrap()
}

#[test]
fn writes_index_and_detail_pages() {
    let temp = tempfile::tempdir().unwrap();
    let out = out_dir(&temp);
    let bach = dataset("bach", "BACH <2018>");
    let glas = dataset("glas", "GlaS");
    let view = render_rows(&[&bach, &glas]);
    let details = vec![
        detail(
            bach.clone(),
            Some("![grid](https://data.example.org/catalog/bach/img/grid.png)"),
        ),
        detail(glas.clone(), None),
    ];

    let result = write_site(&out, &view, &details, &options()).unwrap();
    assert_eq!(result.datasets, 2);
    assert_eq!(result.details.len(), 2);
    assert!(!result.generated_at.is_empty());

    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains("<strong>2</strong> datasets"));
    assert!(index.contains("id=\"datasets-table\""));
    assert!(index.contains("href=\"detail/bach.html\""));
    assert!(index.contains("BACH &lt;2018&gt;"));
    assert!(!index.contains("BACH <2018>"));

    let bach_page = fs::read_to_string(detail_path(&out, &"bach".parse().unwrap())).unwrap();
    assert!(bach_page.contains("src=\"https://data.example.org/catalog/bach/img/grid.png\""));
    assert!(bach_page.contains("href=\"../index.html\""));

    let glas_page = fs::read_to_string(out.join("detail/glas.html")).unwrap();
    assert!(glas_page.contains("No detailed description"));
    assert!(glas_page.contains("<div class=\"info-label\">Organs</div>"));
}

#[test]
fn empty_view_writes_no_results_row() {
    let temp = tempfile::tempdir().unwrap();
    let out = out_dir(&temp);
    let result = write_site(&out, &TableView::NoResults, &[], &options()).unwrap();
    assert_eq!(result.datasets, 0);
    let index = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(index.contains(NO_RESULTS));
    assert!(index.contains("<strong>0</strong> datasets"));
}

#[test]
fn rewriting_replaces_existing_pages() {
    let temp = tempfile::tempdir().unwrap();
    let out = out_dir(&temp);
    let glas = dataset("glas", "GlaS");
    let view = render_rows(&[&glas]);

    write_site(&out, &view, &[detail(glas.clone(), Some("first"))], &options()).unwrap();
    write_site(&out, &view, &[detail(glas, Some("second"))], &options()).unwrap();

    let page = fs::read_to_string(out.join("detail/glas.html")).unwrap();
    assert!(page.contains("second"));
    assert!(!page.contains("first"));
}

#[test]
fn ids_that_escape_the_output_dir_are_skipped() {
    let temp = tempfile::tempdir().unwrap();
    let out = out_dir(&temp);
    let sneaky = dataset("../escape", "Sneaky");
    let glas = dataset("glas", "GlaS");
    let view = render_rows(&[&sneaky, &glas]);
    let details = vec![detail(sneaky, None), detail(glas, None)];

    let result = write_site(&out, &view, &details, &options()).unwrap();
    assert_eq!(result.skipped, vec!["../escape".to_string()]);
    assert_eq!(result.details.len(), 1);
    assert!(out.join("detail/glas.html").exists());
    assert!(!out.join("escape.html").exists());
}

#[test]
fn detail_path_uses_raw_id() {
    let id: DatasetId = "my set".parse().unwrap();
    assert_eq!(
        detail_path(&Utf8PathBuf::from("out"), &id),
        Utf8PathBuf::from("out/detail/my set.html")
    );
}
