use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::fpl_types::Team;
use crate::scout::{FixtureRow, ScoutReport};
use crate::scout_score::ScoredPlayer;

pub struct ExportSummary {
    pub players: usize,
    pub teams: usize,
    pub fixtures: usize,
}

/// Writes the given (already filtered) picks plus the report's table and fixtures to an
/// xlsx workbook.
pub fn export_report(
    path: &Path,
    report: &ScoutReport,
    picks: &[&ScoredPlayer],
) -> Result<ExportSummary> {
    let mut pick_rows = vec![header(&[
        "Rank", "Player", "Full Name", "Team", "Pos", "Price", "Form", "Points", "Minutes",
        "Next3 FDR", "Value", "Smart Score", "Owned %", "Status", "News",
    ])];
    pick_rows.extend(picks.iter().enumerate().map(|(idx, p)| pick_row(idx + 1, p)));

    let mut table_rows = vec![header(&[
        "Pos", "Team", "Pld", "W", "D", "L", "GF", "GA", "Pts", "Next3 FDR",
    ])];
    table_rows.extend(report.standings.iter().map(|t| table_row(t, report)));

    let mut fixture_rows = vec![header(&[
        "GW", "Kickoff", "Home", "Away", "Home FDR", "Away FDR",
    ])];
    fixture_rows.extend(report.upcoming.iter().map(fixture_row));

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Picks")?;
        write_rows(sheet, &pick_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Standings")?;
        write_rows(sheet, &table_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fixtures")?;
        write_rows(sheet, &fixture_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    let summary = ExportSummary {
        players: pick_rows.len().saturating_sub(1),
        teams: table_rows.len().saturating_sub(1),
        fixtures: fixture_rows.len().saturating_sub(1),
    };
    info!(path = %path.display(), players = summary.players, "exported workbook");
    Ok(summary)
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn pick_row(rank: usize, p: &ScoredPlayer) -> Vec<String> {
    vec![
        rank.to_string(),
        p.name.clone(),
        p.full_name.clone(),
        p.team_name.clone(),
        p.position.label().to_string(),
        format!("{:.1}", p.cost),
        format!("{:.1}", p.form),
        format!("{:.0}", p.total_points),
        p.minutes.to_string(),
        format!("{:.2}", p.next3_difficulty),
        format!("{:.2}", p.value),
        format!("{:.2}", p.smart_score),
        p.selected_by_percent
            .map(|pct| format!("{pct:.1}"))
            .unwrap_or_default(),
        p.status.label().to_string(),
        p.news.clone(),
    ]
}

fn table_row(team: &Team, report: &ScoutReport) -> Vec<String> {
    vec![
        team.position.to_string(),
        team.name.clone(),
        team.played.to_string(),
        team.win.to_string(),
        team.draw.to_string(),
        team.loss.to_string(),
        team.goals_for.to_string(),
        team.goals_against.to_string(),
        team.points.to_string(),
        report
            .team_difficulty
            .get(&team.id)
            .map(|d| format!("{d:.2}"))
            .unwrap_or_default(),
    ]
}

fn fixture_row(row: &FixtureRow) -> Vec<String> {
    vec![
        row.gameweek.to_string(),
        row.kickoff.clone().unwrap_or_default(),
        row.home.clone(),
        row.away.clone(),
        row.home_difficulty.to_string(),
        row.away_difficulty.to_string(),
    ]
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
