//! Catalog loading from disk

mod common;

use std::path::PathBuf;

use igt_autosplitter::games::{Family, GameCatalog};
use igt_autosplitter::AutosplitterError;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("catalog/sample.toml")
}

#[test]
fn test_sample_catalog_loads() {
    common::init_logging();
    let catalog = GameCatalog::load(&sample_path()).unwrap();

    assert_eq!(catalog.titles().len(), 2);
    let temple = catalog.title("lost-temple").unwrap();
    assert_eq!(temple.family, Family::Classic);
    assert_eq!(temple.tick_rate(), 30);
    assert!(temple.classic.area_select_quirk);
    assert_eq!(temple.versions.len(), 2);

    let gold = temple.select_variant(Some(1)).unwrap();
    assert_eq!(gold.id, "lost-temple-gold");
    assert_eq!(gold.first_segment, 16);

    let city = catalog.title("sunken-city").unwrap();
    assert_eq!(city.family, Family::Later);
    assert_eq!(city.tick_rate(), 60);
    assert_eq!(city.max_completions(9), 2);
    assert_eq!(city.max_completions(3), 1);
    assert_eq!(city.select_variant(None).unwrap().home_segment, Some(20));
}

#[test]
fn test_sample_catalog_lookups() {
    let catalog = GameCatalog::load(&sample_path()).unwrap();

    assert_eq!(
        catalog.find_title_by_process("TEMPLE_GOLD.EXE").map(|t| t.id.as_str()),
        Some("lost-temple")
    );

    let version = catalog
        .describe("C04D2E9A71F83B56E0D9A2C4B6F8E1A3D5C7B9F0E2A4C6D8B0F1E3A5C7D9B2F4")
        .unwrap();
    assert_eq!(version.title_id, "lost-temple");
    assert_eq!(version.version_id, "1.1-gold");

    let (_, config) = catalog.resolve(&version).unwrap();
    let saved = &config.fields["saved_times"];
    assert_eq!(saved.count, 19);

    let mut names = catalog.all_process_names();
    names.sort();
    assert_eq!(names, vec!["sunken.exe", "temple.exe", "temple_gold.exe"]);
}

#[test]
fn test_load_dir_merges_and_rejects_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(sample_path(), dir.path().join("a.toml")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

    let catalog = GameCatalog::load_dir(dir.path()).unwrap();
    assert_eq!(catalog.titles().len(), 2);

    // The same titles a second time
    std::fs::copy(sample_path(), dir.path().join("b.toml")).unwrap();
    let err = GameCatalog::load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, AutosplitterError::ConfigError(_)));
}

#[test]
fn test_malformed_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[[title]]\nid = ").unwrap();
    assert!(matches!(
        GameCatalog::load(&path),
        Err(AutosplitterError::Toml(_))
    ));

    assert!(matches!(
        GameCatalog::load(&dir.path().join("missing.toml")),
        Err(AutosplitterError::Io(_))
    ));
}
