use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub(crate) const LOG_ENV: &str = "AUTOBUDGET_LOG";
pub(crate) const LOG_FILE: &str = "autobudget.log";

/// Send tracing output to a log file in `data_dir`. The terminal belongs to
/// the TUI, so nothing is written to stdout or stderr.
pub(crate) fn init(data_dir: &Path) -> Result<()> {
    let path = data_dir.join(LOG_FILE);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
    Ok(())
}
