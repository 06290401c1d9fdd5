use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::fixture_difficulty::{DifficultyConfig, FinishedPolicy};
use crate::fpl_fetch::FPL_API_BASE;
use crate::scout_score::ScoreConfig;

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub api_base: String,
    pub http_timeout: Option<Duration>,
    pub difficulty: DifficultyConfig,
    pub scoring: ScoreConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            api_base: FPL_API_BASE.to_string(),
            http_timeout: None,
            difficulty: DifficultyConfig::default(),
            scoring: ScoreConfig::default(),
        }
    }
}

impl ScoutConfig {
    /// Reads `SCOUT_*` overrides from the environment. Unset or unparsable values keep the
    /// defaults. Call `load_dotenv` first to pick up `.env` files.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(base) = lookup("SCOUT_API_BASE").filter(|v| !v.trim().is_empty()) {
            cfg.api_base = base.trim().to_string();
        }
        cfg.http_timeout = parse_value::<u64>(lookup("SCOUT_HTTP_TIMEOUT_SECS"))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        if let Some(d) =
            parse_value::<f64>(lookup("SCOUT_BLANK_DIFFICULTY")).filter(|d| d.is_finite())
        {
            cfg.difficulty.blank_difficulty = d.clamp(1.0, 5.0);
        }
        if let Some(n) = parse_value::<u32>(lookup("SCOUT_WINDOW_GWS")) {
            cfg.difficulty.window_gameweeks = n.clamp(1, 38);
        }
        if let Some(include) = lookup("SCOUT_INCLUDE_FINISHED").and_then(|raw| parse_flag(&raw)) {
            cfg.difficulty.finished = if include {
                FinishedPolicy::IncludeFinished
            } else {
                FinishedPolicy::UnfinishedOnly
            };
        }
        if let Some(m) = parse_value::<u32>(lookup("SCOUT_MIN_MINUTES")) {
            cfg.scoring.min_minutes = m;
        }

        cfg
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn parse_value<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|val| val.trim().parse::<T>().ok())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
