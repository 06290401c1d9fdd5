use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

const DEFAULT_FILTER: &str = "fpl_scout=info,warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs to `<dir>/fpl_scout.log`; the dashboard owns the terminal.
pub fn init_file_tracing(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create log dir {}", dir.display()))?;
    let log_file = File::create(dir.join("fpl_scout.log")).context("create log file")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

pub fn init_stderr_tracing() -> Result<()> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}
