use std::collections::VecDeque;

use anyhow::{Context, bail};

use crate::fpl_types::{Position, Team};
use crate::scout::{FixtureRow, ScoutReport};
use crate::scout_score::ScoredPlayer;

pub const PRICE_MIN: f64 = 4.0;
pub const PRICE_MAX: f64 = 15.0;
pub const PRICE_STEP: f64 = 0.5;

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Picks,
    Standings,
    Fixtures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    All,
    Only(Position),
}

impl PositionFilter {
    pub fn matches(self, position: Position) -> bool {
        match self {
            PositionFilter::All => true,
            PositionFilter::Only(p) => p == position,
        }
    }

    pub fn next(self) -> Self {
        match self {
            PositionFilter::All => PositionFilter::Only(Position::Goalkeeper),
            PositionFilter::Only(Position::Goalkeeper) => PositionFilter::Only(Position::Defender),
            PositionFilter::Only(Position::Defender) => PositionFilter::Only(Position::Midfielder),
            PositionFilter::Only(Position::Midfielder) => PositionFilter::Only(Position::Forward),
            PositionFilter::Only(Position::Forward) => PositionFilter::All,
        }
    }
}

/// Pure predicate behind both dashboard filters.
pub fn matches_filters(player: &ScoredPlayer, position: PositionFilter, max_price: f64) -> bool {
    position.matches(player.position) && player.cost <= max_price
}

/// Snaps to the 0.5 grid inside the slider range. NaN maps to the top of the range.
pub fn clamp_price(price: f64) -> f64 {
    if price.is_nan() {
        return PRICE_MAX;
    }
    let snapped = (price / PRICE_STEP).round() * PRICE_STEP;
    snapped.clamp(PRICE_MIN, PRICE_MAX)
}

/// Parses a user-supplied price cap and snaps it to the slider grid.
pub fn parse_max_price(raw: &str) -> anyhow::Result<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("max price {raw:?} is not a number"))?;
    if !price.is_finite() {
        bail!("max price must be finite, got {raw:?}");
    }
    Ok(clamp_price(price))
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub position_filter: PositionFilter,
    pub max_price: f64,
    pub selected: usize,
    pub scroll: u16,
    pub report: Option<ScoutReport>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Picks,
            position_filter: PositionFilter::All,
            max_price: PRICE_MAX,
            selected: 0,
            scroll: 0,
            report: None,
            loading: false,
            last_error: None,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn filtered_players(&self) -> Vec<&ScoredPlayer> {
        let Some(report) = &self.report else {
            return Vec::new();
        };
        report
            .recommendations
            .iter()
            .filter(|p| matches_filters(p, self.position_filter, self.max_price))
            .collect()
    }

    pub fn top_pick(&self) -> Option<&ScoredPlayer> {
        self.filtered_players().into_iter().next()
    }

    pub fn selected_player(&self) -> Option<&ScoredPlayer> {
        self.filtered_players().get(self.selected).copied()
    }

    pub fn standings(&self) -> &[Team] {
        self.report
            .as_ref()
            .map(|r| r.standings.as_slice())
            .unwrap_or_default()
    }

    pub fn upcoming(&self) -> &[FixtureRow] {
        self.report
            .as_ref()
            .map(|r| r.upcoming.as_slice())
            .unwrap_or_default()
    }

    pub fn set_report(&mut self, report: ScoutReport) {
        self.push_log(format!(
            "[INFO] Scored {} players for {}",
            report.recommendations.len(),
            report.window.label()
        ));
        if !report.window.from_next_flag {
            self.push_log("[WARN] No next gameweek flagged; using GW1 window");
        }
        self.report = Some(report);
        self.last_error = None;
        self.loading = false;
        self.clamp_selection();
    }

    /// Keeps the previous report so the dashboard stays usable after a failed refresh.
    pub fn set_error(&mut self, err: &anyhow::Error) {
        let msg = format!("{err:#}");
        self.push_log(format!("[WARN] Refresh failed: {msg}"));
        self.last_error = Some(msg);
        self.loading = false;
    }

    pub fn cycle_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Picks => Screen::Standings,
            Screen::Standings => Screen::Fixtures,
            Screen::Fixtures => Screen::Picks,
        };
        self.scroll = 0;
    }

    pub fn cycle_position(&mut self) {
        self.position_filter = self.position_filter.next();
        self.selected = 0;
        self.push_log(format!(
            "[INFO] Position: {}",
            position_filter_label(self.position_filter)
        ));
    }

    pub fn raise_price(&mut self) {
        self.set_max_price(self.max_price + PRICE_STEP);
    }

    pub fn lower_price(&mut self) {
        self.set_max_price(self.max_price - PRICE_STEP);
    }

    pub fn set_max_price(&mut self, price: f64) {
        self.max_price = clamp_price(price);
        self.clamp_selection();
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Picks => {
                let total = self.filtered_players().len();
                if total > 0 && self.selected + 1 < total {
                    self.selected += 1;
                }
            }
            Screen::Standings | Screen::Fixtures => {
                self.scroll = self.scroll.saturating_add(1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Picks => self.selected = self.selected.saturating_sub(1),
            Screen::Standings | Screen::Fixtures => {
                self.scroll = self.scroll.saturating_sub(1);
            }
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn clamp_selection(&mut self) {
        let total = self.filtered_players().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }
}

pub fn position_filter_label(filter: PositionFilter) -> &'static str {
    match filter {
        PositionFilter::All => "All",
        PositionFilter::Only(p) => p.label(),
    }
}

/// One-line summary of a pick for the detail bar: full name, ownership and news.
pub fn player_detail(player: &ScoredPlayer) -> String {
    let owned = player
        .selected_by_percent
        .map(|pct| format!("{pct:.1}%"))
        .unwrap_or_else(|| "-".to_string());
    let news = if player.news.trim().is_empty() {
        player.status.label().to_string()
    } else {
        player.news.trim().to_string()
    };
    format!(
        "{} ({}, {}) | Owned {} | {}",
        player.full_name,
        player.team_name,
        player.position.label(),
        owned,
        news
    )
}

pub fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Picks => "PICKS",
        Screen::Standings => "TABLE",
        Screen::Fixtures => "FIXTURES",
    }
}
