use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use fpl_scout::config::ScoutConfig;
use fpl_scout::fpl_fetch::{fetch_fixtures, parse_bootstrap_json, parse_fixtures_json};
use fpl_scout::fpl_types::Position;
use fpl_scout::scout::{ScoutReport, build_report, run_scout};
use fpl_scout::scout_export::export_report;
use fpl_scout::state::{PositionFilter, matches_filters};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn report() -> ScoutReport {
    let bootstrap =
        parse_bootstrap_json(&read_fixture("bootstrap.json")).expect("bootstrap should parse");
    let fixtures =
        parse_fixtures_json(&read_fixture("fixtures.json")).expect("fixtures should parse");
    build_report(&bootstrap, &fixtures, &ScoutConfig::default()).expect("report should build")
}

fn unreachable_config() -> ScoutConfig {
    ScoutConfig {
        api_base: "http://127.0.0.1:1".to_string(),
        http_timeout: Some(Duration::from_secs(5)),
        ..ScoutConfig::default()
    }
}

fn temp_workbook(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("fpl_scout_{}_{name}.xlsx", std::process::id()));
    path
}

#[test]
fn unreachable_api_fails_the_cycle() {
    let err = run_scout(&unreachable_config()).unwrap_err();
    assert!(format!("{err:#}").contains("bootstrap request failed"));
}

#[test]
fn unreachable_fixtures_endpoint_is_an_error() {
    let err = fetch_fixtures(&unreachable_config()).unwrap_err();
    assert!(format!("{err:#}").contains("fixtures request failed"));
}

#[test]
fn export_writes_all_sheets() {
    let report = report();
    let picks: Vec<_> = report.recommendations.iter().collect();
    let path = temp_workbook("all");

    let summary = export_report(&path, &report, &picks).expect("export should succeed");
    assert_eq!(summary.players, 6);
    assert_eq!(summary.teams, 5);
    assert_eq!(summary.fixtures, 6);
    assert!(fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));
    let _ = fs::remove_file(&path);
}

#[test]
fn export_uses_the_filtered_picks() {
    let report = report();
    let picks: Vec<_> = report
        .recommendations
        .iter()
        .filter(|p| matches_filters(p, PositionFilter::Only(Position::Goalkeeper), 15.0))
        .collect();
    let path = temp_workbook("gkp");

    let summary = export_report(&path, &report, &picks).expect("export should succeed");
    assert_eq!(summary.players, 2);
    assert_eq!(summary.teams, 5);
    let _ = fs::remove_file(&path);
}

#[test]
fn export_to_missing_directory_fails() {
    let report = report();
    let mut path = std::env::temp_dir();
    path.push(format!("fpl_scout_missing_{}", std::process::id()));
    path.push("nested");
    path.push("out.xlsx");
    let err = export_report(&path, &report, &[]).err().expect("export should fail");
    assert!(format!("{err:#}").contains("failed writing workbook"));
}
