//! Conformance tests that run YAML fixtures against tokre
//!
//! Run with: cargo test -p tokre-test --test conformance --features tokre-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use std::fs;
use std::path::{Path, PathBuf};

use tokre_test::fixture::Fixture;

/// The fixtures directory next to this crate's manifest
fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one YAML file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    println!("Running fixture file: {}", path.display());

    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_algebra() {
    run_fixture_file("01_algebra.yaml");
}

#[test]
fn test_repetition() {
    run_fixture_file("02_repetition.yaml");
}

#[test]
fn test_captures() {
    run_fixture_file("03_captures.yaml");
}

#[test]
fn test_ambiguity() {
    run_fixture_file("04_ambiguity.yaml");
}

#[test]
fn test_words() {
    run_fixture_file("05_words.yaml");
}
