//! Fixture regression test
//!
//! Runs saved model responses from tests/fixtures/ through the same
//! merge, sanity and estimate path the `merge` and `estimate` commands use.
//!
//! Usage:
//!   cargo test -p smeta-cli --test fixture_regression -- --nocapture

use smeta_app::app::{build_estimate, hints_from_analysis};
use smeta_domain::{merge, validate_analysis, EstimatorOptions, SanityChecker};
use smeta_infra::PriceCatalogLoader;
use smeta_types::{BuildingAnalysis, Hints};
use smeta_vision::parse_page_response;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_page(name: &str) -> BuildingAnalysis {
    let content = std::fs::read_to_string(fixtures_dir().join(name)).unwrap();
    parse_page_response(&content).unwrap()
}

fn load_hints() -> Hints {
    let content = std::fs::read_to_string(fixtures_dir().join("hints.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn merged() -> BuildingAnalysis {
    let analysis = merge(vec![load_page("page_1.json"), load_page("page_2.json")]).unwrap();
    validate_analysis(&analysis).unwrap();
    analysis
}

#[test]
fn test_fixture_pages_merge() {
    let analysis = merged();

    assert_eq!(analysis.total_area_m2, 52.0);
    assert_eq!(analysis.ceiling_height_m, Some(2.7));
    assert_eq!(analysis.bathrooms_count, 1);

    let names: Vec<&str> = analysis.rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Гостиная", "Спальня", "Кухня", "Санузел", "Коридор"]);
    assert_eq!(analysis.rooms[2].perimeter_m, Some(12.0));
}

#[test]
fn test_fixture_passes_sanity_check() {
    let warnings = SanityChecker::default().check(&merged(), Some(&load_hints()));
    assert!(warnings.is_empty(), "{:?}", warnings);
}

#[test]
fn test_fixture_estimate() {
    let analysis = merged();
    let report = build_estimate(
        &analysis,
        &load_hints(),
        &EstimatorOptions::default(),
        &PriceCatalogLoader::builtin(),
    )
    .unwrap();

    assert!(report.estimate.unpriced().is_empty());
    assert_eq!(report.estimate.line_count(), report.work_items.len());

    let sum: f64 = report.estimate.stages.iter().map(|s| s.stage_total).sum();
    assert!((report.estimate.grand_total - sum).abs() < 0.01);
    assert!(report.estimate.grand_total > 0.0);

    let derived = build_estimate(
        &analysis,
        &hints_from_analysis(&analysis),
        &EstimatorOptions::default(),
        &PriceCatalogLoader::builtin(),
    )
    .unwrap();
    assert_eq!(derived.work_items, report.work_items);

    println!(
        "{} lines, grand total {:.2}",
        report.estimate.line_count(),
        report.estimate.grand_total
    );
}
