//! Conformance tests that run YAML fixtures against the engine
//!
//! Run with: cargo test -p hap-test --test conformance --features hap-test/fixtures

#![cfg(feature = "fixtures")]

use hap_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The spec/tests directory relative to the workspace root.
fn fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let workspace_root = Path::new(manifest_dir)
        .parent() // ext
        .and_then(Path::parent) // workspace root
        .expect("could not find workspace root");
    workspace_root.join("spec").join("tests")
}

/// Load and run all fixtures in a directory.
fn run_fixtures_in_dir(dir: &Path) {
    assert!(
        dir.exists(),
        "fixtures directory does not exist: {}",
        dir.display()
    );

    for entry in fs::read_dir(dir).expect("read dir") {
        let path = entry.expect("dir entry").path();
        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            println!("Running fixture file: {}", path.display());
            let yaml = fs::read_to_string(&path).expect("read yaml");
            let fixtures = Fixture::from_yaml_multi(&yaml)
                .unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()));
            for fixture in fixtures {
                println!("  Running: {}", fixture.name);
                fixture.run_and_assert();
            }
        }
    }
}

#[test]
fn test_parsing() {
    run_fixtures_in_dir(&fixtures_dir().join("01_parsing"));
}

#[test]
fn test_validation() {
    run_fixtures_in_dir(&fixtures_dir().join("02_validation"));
}

#[test]
fn test_matching() {
    run_fixtures_in_dir(&fixtures_dir().join("03_matching"));
}
