use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::ScoutError;
use crate::fpl_types::{Player, PlayerStatus, Position};

pub const MAX_DIFFICULTY: f64 = 5.0;
pub const MIN_MINUTES: u32 = 450;

/// Nominal weights of the smart score. The components live on different scales
/// (form ~0-10, fixture ease 0-4, value can exceed 10), so these are not proportional
/// contributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub form: f64,
    pub fixture_ease: f64,
    pub value: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            form: 0.5,
            fixture_ease: 0.3,
            value: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoreConfig {
    pub weights: ScoreWeights,
    /// Players need strictly more minutes than this to be recommended.
    pub min_minutes: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            min_minutes: MIN_MINUTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPlayer {
    pub id: u32,
    pub name: String,
    pub full_name: String,
    pub team_id: u32,
    pub team_name: String,
    pub position: Position,
    pub status: PlayerStatus,
    pub minutes: u32,
    pub cost: f64,
    pub form: f64,
    pub total_points: f64,
    pub next3_difficulty: f64,
    pub value: f64,
    pub smart_score: f64,
    pub selected_by_percent: Option<f64>,
    pub news: String,
}

/// Season points per million. Zero-cost records yield 0.0 instead of dividing by zero.
pub fn value_per_cost(total_points: f64, cost: f64) -> f64 {
    if cost > 0.0 { total_points / cost } else { 0.0 }
}

pub fn invert_difficulty(difficulty: f64) -> f64 {
    MAX_DIFFICULTY - difficulty
}

pub fn smart_score(form: f64, difficulty: f64, value: f64, weights: ScoreWeights) -> f64 {
    weights.form * form + weights.fixture_ease * invert_difficulty(difficulty) + weights.value * value
}

pub fn is_recommendable(player: &ScoredPlayer, min_minutes: u32) -> bool {
    player.status.is_active() && player.minutes > min_minutes
}

/// Joins one player with its team and computes the score. `Ok(None)` means the record has a
/// position code outside the four playing positions and is skipped.
pub fn score_player(
    player: &Player,
    team_names: &HashMap<u32, String>,
    team_difficulty: &HashMap<u32, f64>,
    weights: ScoreWeights,
) -> Result<Option<ScoredPlayer>, ScoutError> {
    let Some(position) = Position::from_code(player.element_type) else {
        warn!(
            player_id = player.id,
            element_type = player.element_type,
            "skipping player with unknown position code"
        );
        return Ok(None);
    };

    let unknown_team = || ScoutError::UnknownTeam {
        player_id: player.id,
        team_id: player.team,
    };
    let team_name = team_names.get(&player.team).ok_or_else(unknown_team)?;
    let difficulty = *team_difficulty.get(&player.team).ok_or_else(unknown_team)?;

    let cost = player.cost();
    let form = player.form.as_f64().ok_or_else(|| ScoutError::MalformedField {
        player_id: player.id,
        field: "form",
        raw: player.form.raw(),
    })?;
    let total_points = player
        .total_points
        .as_f64()
        .ok_or_else(|| ScoutError::MalformedField {
            player_id: player.id,
            field: "total_points",
            raw: player.total_points.raw(),
        })?;

    let value = value_per_cost(total_points, cost);
    let score = smart_score(form, difficulty, value, weights);

    Ok(Some(ScoredPlayer {
        id: player.id,
        name: player.web_name.clone(),
        full_name: player.full_name(),
        team_id: player.team,
        team_name: team_name.clone(),
        position,
        status: player.status.clone(),
        minutes: player.minutes,
        cost,
        form,
        total_points,
        next3_difficulty: difficulty,
        value,
        smart_score: score,
        selected_by_percent: player.selected_by_percent.as_ref().and_then(|s| s.as_f64()),
        news: player.news.clone(),
    }))
}

/// Scores every player, keeps the recommendable ones and orders them by descending score.
/// Ties keep their input order.
pub fn rank_players(
    players: &[Player],
    team_names: &HashMap<u32, String>,
    team_difficulty: &HashMap<u32, f64>,
    cfg: &ScoreConfig,
) -> Result<Vec<ScoredPlayer>, ScoutError> {
    let mut scored = Vec::with_capacity(players.len());
    for player in players {
        if let Some(row) = score_player(player, team_names, team_difficulty, cfg.weights)? {
            scored.push(row);
        }
    }

    let before = scored.len();
    scored.retain(|p| is_recommendable(p, cfg.min_minutes));
    debug!(scored = before, kept = scored.len(), "filtered recommendations");

    scored.sort_by(|a, b| b.smart_score.total_cmp(&a.smart_score));
    Ok(scored)
}
