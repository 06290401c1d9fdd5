use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::config::ScoutConfig;
use crate::fpl_types::{Bootstrap, Fixture};
use crate::http_client::http_client;

pub const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

const BOOTSTRAP_PATH: &str = "/bootstrap-static/";
const FIXTURES_PATH: &str = "/fixtures/";

/// Players, teams and gameweeks in one request.
pub fn fetch_bootstrap(cfg: &ScoutConfig) -> Result<Bootstrap> {
    let client = http_client(cfg.http_timeout)?;
    let url = endpoint(&cfg.api_base, BOOTSTRAP_PATH);
    let body = fetch_json(client, &url).context("bootstrap request failed")?;
    let data = parse_bootstrap_json(&body)?;
    info!(
        players = data.elements.len(),
        teams = data.teams.len(),
        events = data.events.len(),
        "fetched bootstrap"
    );
    Ok(data)
}

/// Full season schedule.
pub fn fetch_fixtures(cfg: &ScoutConfig) -> Result<Vec<Fixture>> {
    let client = http_client(cfg.http_timeout)?;
    let url = endpoint(&cfg.api_base, FIXTURES_PATH);
    let body = fetch_json(client, &url).context("fixtures request failed")?;
    let fixtures = parse_fixtures_json(&body)?;
    if fixtures.is_empty() {
        warn!("fixtures list is empty; every team will get the blank difficulty");
    }
    info!(fixtures = fixtures.len(), "fetched fixtures");
    Ok(fixtures)
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty bootstrap response"));
    }
    serde_json::from_str(trimmed).context("invalid bootstrap json")
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty fixtures response"));
    }
    serde_json::from_str(trimmed).context("invalid fixtures json")
}

fn fetch_json(client: &Client, url: &str) -> Result<String> {
    debug!(%url, "GET");
    let resp = client.get(url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, truncate(&body, 200)));
    }
    Ok(body)
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
