use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::ScoutConfig;
use crate::fixture_difficulty::{
    GameweekWindow, compute_team_difficulty, current_gameweek, resolve_window,
    upcoming_fixtures,
};
use crate::fpl_fetch;
use crate::fpl_types::{Bootstrap, Fixture, Team};
use crate::scout_score::{ScoredPlayer, rank_players};

/// One complete fetch-and-score cycle. Built fresh every time; nothing is carried over.
#[derive(Debug, Clone)]
pub struct ScoutReport {
    pub window: GameweekWindow,
    pub current_gameweek: Option<u32>,
    pub recommendations: Vec<ScoredPlayer>,
    pub standings: Vec<Team>,
    pub upcoming: Vec<FixtureRow>,
    pub team_difficulty: HashMap<u32, f64>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRow {
    pub id: u32,
    pub gameweek: u32,
    pub kickoff: Option<String>,
    pub home: String,
    pub away: String,
    pub home_difficulty: u8,
    pub away_difficulty: u8,
}

impl FixtureRow {
    /// Kickoff as `Sat 13 Sep 14:00` (UTC); `TBD` when unscheduled or unparsable.
    pub fn kickoff_label(&self) -> String {
        self.kickoff
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc).format("%a %d %b %H:%M").to_string())
            .unwrap_or_else(|| "TBD".to_string())
    }
}

impl ScoutReport {
    pub fn top_pick(&self) -> Option<&ScoredPlayer> {
        self.recommendations.first()
    }

    /// Upcoming fixtures grouped by gameweek, in window order.
    pub fn fixtures_by_gameweek(&self) -> Vec<(u32, Vec<&FixtureRow>)> {
        let mut groups: Vec<(u32, Vec<&FixtureRow>)> = Vec::new();
        for row in &self.upcoming {
            match groups.last_mut() {
                Some((gw, rows)) if *gw == row.gameweek => rows.push(row),
                _ => groups.push((row.gameweek, vec![row])),
            }
        }
        groups
    }
}

/// Fetches both endpoints and builds the report.
pub fn run_scout(cfg: &ScoutConfig) -> Result<ScoutReport> {
    let bootstrap = fpl_fetch::fetch_bootstrap(cfg)?;
    let fixtures = fpl_fetch::fetch_fixtures(cfg)?;
    build_report(&bootstrap, &fixtures, cfg)
}

/// Offline half of the cycle: aggregate fixture difficulty, score and rank players.
pub fn build_report(
    bootstrap: &Bootstrap,
    fixtures: &[Fixture],
    cfg: &ScoutConfig,
) -> Result<ScoutReport> {
    let window = resolve_window(&bootstrap.events, cfg.difficulty.window_gameweeks);

    let team_names: HashMap<u32, String> = bootstrap
        .teams
        .iter()
        .map(|t| (t.id, t.name.clone()))
        .collect();
    let team_difficulty = compute_team_difficulty(
        fixtures,
        team_names.keys().copied(),
        window,
        &cfg.difficulty,
    );

    let recommendations = rank_players(
        &bootstrap.elements,
        &team_names,
        &team_difficulty,
        &cfg.scoring,
    )
    .context("failed scoring players")?;

    let upcoming = upcoming_fixtures(fixtures, window, cfg.difficulty.finished)
        .into_iter()
        .map(|f| FixtureRow {
            id: f.id,
            gameweek: f.event.unwrap_or(window.start),
            kickoff: f.kickoff_time.clone(),
            home: team_label(&bootstrap.teams, f.team_h),
            away: team_label(&bootstrap.teams, f.team_a),
            home_difficulty: f.team_h_difficulty,
            away_difficulty: f.team_a_difficulty,
        })
        .collect();

    info!(
        window = %window.label(),
        recommended = recommendations.len(),
        "scout report ready"
    );

    Ok(ScoutReport {
        window,
        current_gameweek: current_gameweek(&bootstrap.events),
        recommendations,
        standings: league_table(&bootstrap.teams, fixtures),
        upcoming,
        team_difficulty,
        generated_at: Utc::now(),
    })
}

/// League table. The feed's own columns are used when it fills them in; when every team
/// still reads zero the table is rebuilt from finished fixture scores.
pub fn league_table(teams: &[Team], fixtures: &[Fixture]) -> Vec<Team> {
    let upstream_filled = teams
        .iter()
        .any(|t| t.position > 0 || t.played > 0 || t.points > 0);
    let has_results = fixtures.iter().any(|f| final_score(f).is_some());
    if upstream_filled || !has_results {
        return order_by_position(teams);
    }
    debug!("team table empty upstream; rebuilding from results");
    table_from_results(teams, fixtures)
}

/// Position 0 (not yet ranked) sorts last, by points.
fn order_by_position(teams: &[Team]) -> Vec<Team> {
    let mut out = teams.to_vec();
    out.sort_by(|a, b| {
        (a.position == 0)
            .cmp(&(b.position == 0))
            .then(a.position.cmp(&b.position))
            .then(b.points.cmp(&a.points))
            .then_with(|| a.name.cmp(&b.name))
    });
    out
}

/// Win 3, draw 1; ties broken by goal difference, goals scored, then name.
fn table_from_results(teams: &[Team], fixtures: &[Fixture]) -> Vec<Team> {
    let mut rows: HashMap<u32, Team> = teams
        .iter()
        .map(|t| {
            let blank = Team {
                position: 0,
                points: 0,
                played: 0,
                win: 0,
                draw: 0,
                loss: 0,
                goals_for: 0,
                goals_against: 0,
                ..t.clone()
            };
            (t.id, blank)
        })
        .collect();

    for f in fixtures {
        let Some((home_goals, away_goals)) = final_score(f) else {
            continue;
        };
        if let Some(home) = rows.get_mut(&f.team_h) {
            record_result(home, home_goals, away_goals);
        }
        if let Some(away) = rows.get_mut(&f.team_a) {
            record_result(away, away_goals, home_goals);
        }
    }

    let mut out: Vec<Team> = rows.into_values().collect();
    out.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(goal_difference(b).cmp(&goal_difference(a)))
            .then(b.goals_for.cmp(&a.goals_for))
            .then_with(|| a.name.cmp(&b.name))
    });
    for (idx, team) in out.iter_mut().enumerate() {
        team.position = idx as u32 + 1;
    }
    out
}

fn final_score(f: &Fixture) -> Option<(u32, u32)> {
    if !f.finished {
        return None;
    }
    Some((u32::from(f.team_h_score?), u32::from(f.team_a_score?)))
}

fn record_result(team: &mut Team, scored: u32, conceded: u32) {
    team.played += 1;
    team.goals_for += scored;
    team.goals_against += conceded;
    match scored.cmp(&conceded) {
        std::cmp::Ordering::Greater => {
            team.win += 1;
            team.points += 3;
        }
        std::cmp::Ordering::Equal => {
            team.draw += 1;
            team.points += 1;
        }
        std::cmp::Ordering::Less => team.loss += 1,
    }
}

fn goal_difference(team: &Team) -> i64 {
    i64::from(team.goals_for) - i64::from(team.goals_against)
}

fn team_label(teams: &[Team], id: u32) -> String {
    teams
        .iter()
        .find(|t| t.id == id)
        .map(|t| {
            if t.short_name.is_empty() {
                t.name.clone()
            } else {
                t.short_name.clone()
            }
        })
        .unwrap_or_else(|| format!("#{id}"))
}
