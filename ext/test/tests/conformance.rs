//! Conformance tests that run YAML fixtures against rewire
//!
//! Run with: cargo test -p rewire-test --test conformance --features rewire-test/fixtures

#![cfg(feature = "fixtures")]

use rewire_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file.
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_patterns() {
    run_fixture_file("01_patterns.yaml");
}

#[test]
fn test_parameters() {
    run_fixture_file("02_parameters.yaml");
}

#[test]
fn test_candidates() {
    run_fixture_file("03_candidates.yaml");
}

#[test]
fn test_composition() {
    run_fixture_file("04_composition.yaml");
}

#[test]
fn test_transposers() {
    run_fixture_file("05_transposers.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let is_yaml = path
                .extension()
                .is_some_and(|e| e == "yaml" || e == "yml");
            is_yaml.then(|| path.file_name()?.to_str().map(str::to_string))?
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "01_patterns.yaml",
            "02_parameters.yaml",
            "03_candidates.yaml",
            "04_composition.yaml",
            "05_transposers.yaml",
        ]
    );
}
