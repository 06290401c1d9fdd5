use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use fpl_scout::config::{self, ScoutConfig};
use fpl_scout::fpl_types::Position;
use fpl_scout::logging;
use fpl_scout::scout;
use fpl_scout::scout_export;
use fpl_scout::state::{PRICE_MAX, PositionFilter, matches_filters, parse_max_price};

const DEFAULT_TOP: usize = 10;

struct CliArgs {
    top: usize,
    position: PositionFilter,
    max_price: f64,
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_stderr_tracing()?;
    let args = parse_args(std::env::args().skip(1).collect())?;
    let cfg = ScoutConfig::from_env();

    let report = scout::run_scout(&cfg)?;
    let picks = report
        .recommendations
        .iter()
        .filter(|p| matches_filters(p, args.position, args.max_price))
        .collect::<Vec<_>>();

    println!(
        "Top recommended picks ({}, max £{:.1}m)",
        report.window.label(),
        args.max_price
    );
    println!(
        "{:>3}  {:<16} {:<16} {:<4} {:>6} {:>5} {:>6} {:>6}",
        "#", "Player", "Team", "Pos", "Price", "FDR", "Score", "Own%"
    );
    for (idx, p) in picks.iter().take(args.top).enumerate() {
        println!(
            "{:>3}  {:<16} {:<16} {:<4} {:>6.1} {:>5.2} {:>6.2} {:>6}",
            idx + 1,
            p.name,
            p.team_name,
            p.position.label(),
            p.cost,
            p.next3_difficulty,
            p.smart_score,
            p.selected_by_percent
                .map(|pct| format!("{pct:.1}"))
                .unwrap_or_else(|| "-".to_string())
        );
        if !p.news.trim().is_empty() {
            println!("     {}", p.news.trim());
        }
    }
    if picks.is_empty() {
        println!("No players match the filters");
    }

    if let Some(path) = args.export {
        let summary = scout_export::export_report(&path, &report, &picks)?;
        println!(
            "Exported {} picks, {} teams, {} fixtures to {}",
            summary.players,
            summary.teams,
            summary.fixtures,
            path.display()
        );
    }

    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut out = CliArgs {
        top: DEFAULT_TOP,
        position: PositionFilter::All,
        max_price: PRICE_MAX,
        export: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| iter.next())
                .with_context(|| format!("missing value for {flag}"))
        };
        match flag.as_str() {
            "--top" => {
                out.top = value()?.trim().parse().context("--top expects a number")?;
            }
            "--position" => {
                let raw = value()?;
                out.position = if raw.eq_ignore_ascii_case("all") {
                    PositionFilter::All
                } else {
                    let pos = Position::from_label(&raw)
                        .ok_or_else(|| anyhow!("unknown position {raw:?} (GKP, DEF, MID, FWD)"))?;
                    PositionFilter::Only(pos)
                };
            }
            "--max-price" => {
                out.max_price = parse_max_price(&value()?).context("--max-price")?;
            }
            "--export" => {
                out.export = Some(PathBuf::from(value()?));
            }
            other => return Err(anyhow!("unknown argument {other:?}")),
        }
    }
    Ok(out)
}
