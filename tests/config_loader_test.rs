use catalog_facets::config::{ConfigLoader, EngineConfig, PROJECT_CONFIG_FILE};
use catalog_facets::engine::{FacetCount, SearchField};
use catalog_facets::{FacetDimension, FacetEngine, FacetSession, FilterState, Item};
use catalog_facets::CatalogSnapshot;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

const BUCKETS: &str = r#"settings:
  cascade_mode: false
file_size_buckets:
  - label: Small
    max_bytes: 1000
  - label: Medium
    max_bytes: 100000
  - label: Large
label_aliases:
  Installed: Loaded
"#;

#[test]
fn test_project_config_wins_over_user_config() {
    let project = tempdir().unwrap();
    let user = tempdir().unwrap();
    let user_config = user.path().join("config.yaml");

    fs::write(project.path().join(PROJECT_CONFIG_FILE), BUCKETS).unwrap();
    fs::write(&user_config, "settings:\n  cascade_mode: true\n").unwrap();

    let mut loader = ConfigLoader::new();
    let config = loader.load_hierarchy_from(project.path(), Some(&user_config));
    assert!(!config.settings.cascade_mode);
    assert_eq!(config.file_size_buckets.len(), 3);
}

#[test]
fn test_invalid_project_config_falls_back_to_user() {
    let project = tempdir().unwrap();
    let user = tempdir().unwrap();
    let user_config = user.path().join("config.yaml");

    fs::write(
        project.path().join(PROJECT_CONFIG_FILE),
        "file_size_buckets:\n  - label: Any\n  - label: Small\n    max_bytes: 1\n",
    )
    .unwrap();
    fs::write(&user_config, "settings:\n  cascade_mode: true\n").unwrap();

    let mut loader = ConfigLoader::new();
    let config = loader.load_hierarchy_from(project.path(), Some(&user_config));
    assert!(config.settings.cascade_mode);
}

#[test]
fn test_missing_files_yield_defaults() {
    let project = tempdir().unwrap();
    let mut loader = ConfigLoader::new();
    let config = loader.load_hierarchy_from(project.path(), None);
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_json_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("facets.json");
    fs::write(&path, r#"{"search_fields": ["name", "identity"]}"#).unwrap();

    let config = ConfigLoader::new().load_file(&path).unwrap();
    assert_eq!(
        config.search_fields,
        vec![SearchField::Name, SearchField::Identity]
    );
}

#[test]
fn test_empty_search_fields_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(PROJECT_CONFIG_FILE);
    fs::write(&path, "search_fields: []\n").unwrap();

    let err = ConfigLoader::new().load_file(&path).unwrap_err();
    assert!(err.to_string().contains("search_fields"));
}

#[test]
fn test_engine_from_config_buckets_and_aliases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(PROJECT_CONFIG_FILE);
    fs::write(&path, BUCKETS).unwrap();
    let config = ConfigLoader::new().load_file(&path).unwrap();
    let engine = FacetEngine::from_config(&config).unwrap();

    let catalog = vec![
        Item::new("a").with_size(10),
        Item::new("b").with_size(5_000_000),
        Item::new("c").with_size(999),
    ];
    let computation = engine.compute(&catalog, &FilterState::default());
    assert_eq!(
        computation.counts.list(FacetDimension::FileSize).unwrap().entries,
        vec![FacetCount::new("Small", 2), FacetCount::new("Large", 1)]
    );

    let mut session = FacetSession::new(
        engine,
        CatalogSnapshot::new(vec![
            Item::new("x").with_status(catalog_facets::ItemStatus::Loaded),
        ]),
    );
    let unknown = session.set_selection(FacetDimension::Status, &["Installed"]);
    assert!(unknown.is_empty());
    assert_eq!(
        session.state().selected_values(FacetDimension::Status),
        vec!["Loaded".to_string()]
    );
}

#[test]
fn test_alias_written_towards_unknown_name_keeps_status_value() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(PROJECT_CONFIG_FILE);
    fs::write(&path, "label_aliases:\n  Loaded: Installed\n").unwrap();
    let config = ConfigLoader::new().load_file(&path).unwrap();
    let engine = FacetEngine::from_config(&config).unwrap();

    let mut session = FacetSession::new(
        engine,
        CatalogSnapshot::new(vec![
            Item::new("x").with_status(catalog_facets::ItemStatus::Loaded),
            Item::new("y").with_status(catalog_facets::ItemStatus::Missing),
        ]),
    );

    assert!(session.set_selection(FacetDimension::Status, &["Loaded"]).is_empty());
    assert_eq!(session.view().filtered, vec![0]);

    assert!(session.set_selection(FacetDimension::Status, &["Installed"]).is_empty());
    assert_eq!(
        session.state().selected_values(FacetDimension::Status),
        vec!["Loaded".to_string()]
    );
    assert_eq!(session.view().filtered, vec![0]);
}
