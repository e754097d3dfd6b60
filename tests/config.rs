use std::time::Duration;

use assert_matches::assert_matches;

use pathology_datasets::config::{Config, ConfigLoader, ConfigOverrides};
use pathology_datasets::error::CatalogError;

fn write_config(dir: &tempfile::TempDir, content: &str) -> String {
    let path = dir.path().join("pathds.json");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn reads_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "schema_version": 1,
            "catalog_url": "https://data.example.org/catalog/",
            "timeout_ms": 5000,
            "site_title": "Lab datasets",
            "render_markdown": false
        }"#,
    );

    let resolved = ConfigLoader::resolve(Some(&path), ConfigOverrides::default()).unwrap();
    assert_eq!(
        resolved.location.index_url().as_str(),
        "https://data.example.org/catalog/_datasets.json"
    );
    assert_eq!(resolved.timeout, Duration::from_millis(5000));
    assert_eq!(resolved.site_title, "Lab datasets");
    assert!(!resolved.render_markdown);
}

#[test]
fn command_line_overrides_win() {
    let config = Config {
        catalog_url: Some("https://old.example.org/".to_string()),
        timeout_ms: Some(1000),
        ..Config::default()
    };
    let overrides = ConfigOverrides {
        catalog_url: Some("https://new.example.org/catalog".to_string()),
        timeout_ms: Some(250),
    };
    let resolved = ConfigLoader::resolve_config(config, overrides).unwrap();
    assert_eq!(
        resolved.location.base().as_str(),
        "https://new.example.org/catalog/"
    );
    assert_eq!(resolved.timeout, Duration::from_millis(250));
}

#[test]
fn overrides_alone_are_enough() {
    let overrides = ConfigOverrides {
        catalog_url: Some("https://data.example.org/catalog/".to_string()),
        timeout_ms: None,
    };
    let resolved = ConfigLoader::resolve_config(Config::default(), overrides).unwrap();
    assert_eq!(resolved.timeout, Duration::from_millis(15_000));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    assert_matches!(
        ConfigLoader::resolve(path.to_str(), ConfigOverrides::default()),
        Err(CatalogError::ConfigRead(_))
    );
}

#[test]
fn invalid_json_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "{ not json");
    assert_matches!(
        ConfigLoader::resolve(Some(&path), ConfigOverrides::default()),
        Err(CatalogError::ConfigParse(_))
    );
}

#[test]
fn local_catalog_in_config_is_refused() {
    let config = Config {
        catalog_url: Some("/home/user/catalog".to_string()),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(config, ConfigOverrides::default()),
        Err(CatalogError::LocalOrigin(_))
    );
}
