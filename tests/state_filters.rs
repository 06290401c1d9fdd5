use std::fs;
use std::path::PathBuf;

use fpl_scout::config::ScoutConfig;
use fpl_scout::fpl_fetch::{parse_bootstrap_json, parse_fixtures_json};
use fpl_scout::fpl_types::Position;
use fpl_scout::scout::{ScoutReport, build_report};
use fpl_scout::state::{
    AppState, PRICE_MAX, PRICE_MIN, PositionFilter, Screen, clamp_price, parse_max_price,
    player_detail, position_filter_label,
};

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

fn ids(state: &AppState) -> Vec<u32> {
    state.filtered_players().iter().map(|p| p.id).collect()
}

#[test]
fn no_report_means_no_rows() {
    let state = AppState::new();
    assert!(state.filtered_players().is_empty());
    assert!(state.top_pick().is_none());
    assert!(state.standings().is_empty());
    assert!(state.upcoming().is_empty());
}

#[test]
fn position_filter_keeps_order() {
    let mut state = AppState::new();
    state.set_report(report());
    assert_eq!(ids(&state), vec![1, 2, 10, 4, 5, 7]);

    state.position_filter = PositionFilter::Only(Position::Goalkeeper);
    assert_eq!(ids(&state), vec![4, 5]);
    assert_eq!(state.top_pick().map(|p| p.name.as_str()), Some("Raya"));

    state.position_filter = PositionFilter::Only(Position::Defender);
    assert_eq!(ids(&state), vec![7]);
}

#[test]
fn price_filter_is_inclusive() {
    let mut state = AppState::new();
    state.set_report(report());
    state.set_max_price(7.5);
    assert_eq!(ids(&state), vec![10, 4, 5, 7]);

    state.position_filter = PositionFilter::Only(Position::Goalkeeper);
    state.set_max_price(5.0);
    assert_eq!(ids(&state), vec![5]);
}

#[test]
fn filtering_never_changes_scores() {
    let mut state = AppState::new();
    let report = report();
    let before = report.recommendations.clone();
    state.set_report(report);
    state.set_max_price(6.0);
    state.cycle_position();
    let after = &state.report.as_ref().unwrap().recommendations;
    assert_eq!(&before, after);
}

#[test]
fn price_steps_clamp_to_slider_range() {
    assert_eq!(clamp_price(3.0), PRICE_MIN);
    assert_eq!(clamp_price(20.0), PRICE_MAX);
    assert_eq!(clamp_price(6.3), 6.5);

    let mut state = AppState::new();
    assert_eq!(state.max_price, PRICE_MAX);
    state.raise_price();
    assert_eq!(state.max_price, PRICE_MAX);
    state.lower_price();
    state.lower_price();
    assert_eq!(state.max_price, 14.0);
    for _ in 0..40 {
        state.lower_price();
    }
    assert_eq!(state.max_price, PRICE_MIN);
}

#[test]
fn position_cycle_has_five_options() {
    let mut state = AppState::new();
    let mut labels = vec![position_filter_label(state.position_filter)];
    for _ in 0..4 {
        state.cycle_position();
        labels.push(position_filter_label(state.position_filter));
    }
    assert_eq!(labels, vec!["All", "GKP", "DEF", "MID", "FWD"]);
    state.cycle_position();
    assert_eq!(state.position_filter, PositionFilter::All);
}

#[test]
fn selection_clamps_when_filter_shrinks() {
    let mut state = AppState::new();
    state.set_report(report());
    for _ in 0..10 {
        state.select_next();
    }
    assert_eq!(state.selected, 5);
    state.set_max_price(5.0);
    // Only Pickford (5.0) and Trialist (0.0) remain.
    assert_eq!(state.selected, 1);
    assert_eq!(state.selected_player().map(|p| p.id), Some(7));
}

#[test]
fn failed_refresh_keeps_previous_report() {
    let mut state = AppState::new();
    state.set_report(report());
    state.loading = true;
    state.set_error(&anyhow::anyhow!("http 503"));
    assert!(!state.loading);
    assert!(state.report.is_some());
    assert_eq!(state.last_error.as_deref(), Some("http 503"));
    assert!(state.logs.back().unwrap().contains("http 503"));
}

#[test]
fn screens_cycle_and_reset_scroll() {
    let mut state = AppState::new();
    state.cycle_screen();
    assert_eq!(state.screen, Screen::Standings);
    state.select_next();
    assert_eq!(state.scroll, 1);
    state.cycle_screen();
    assert_eq!(state.screen, Screen::Fixtures);
    assert_eq!(state.scroll, 0);
    state.cycle_screen();
    assert_eq!(state.screen, Screen::Picks);
}

#[test]
fn non_finite_prices_are_rejected_or_capped() {
    assert_eq!(clamp_price(f64::NAN), PRICE_MAX);
    assert_eq!(clamp_price(f64::INFINITY), PRICE_MAX);
    assert_eq!(clamp_price(f64::NEG_INFINITY), PRICE_MIN);

    assert!(parse_max_price("nan").is_err());
    assert!(parse_max_price("inf").is_err());
    assert!(parse_max_price("cheap").is_err());
    assert_eq!(parse_max_price(" 7.3 ").unwrap(), 7.5);
    assert_eq!(parse_max_price("2").unwrap(), PRICE_MIN);

    let mut state = AppState::new();
    state.set_max_price(f64::NAN);
    assert_eq!(state.max_price, PRICE_MAX);
}

#[test]
fn detail_line_shows_name_ownership_and_news() {
    let mut state = AppState::new();
    state.set_report(report());
    let saka = state.selected_player().expect("first pick selected");
    assert_eq!(
        player_detail(saka),
        "Bukayo Saka (Arsenal, MID) | Owned 35.2% | Available"
    );
    let mut flagged = saka.clone();
    flagged.news = " Hamstring - 75% chance of playing ".to_string();
    assert!(player_detail(&flagged).ends_with("| Hamstring - 75% chance of playing"));

    state.select_next();
    state.select_next();
    state.select_next();
    let raya = state.selected_player().expect("fourth pick selected");
    assert_eq!(raya.id, 4);
    assert_eq!(player_detail(raya), "Raya (Arsenal, GKP) | Owned - | Available");
}
