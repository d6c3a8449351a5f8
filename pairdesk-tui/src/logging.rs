//! File logging.
//!
//! The terminal belongs to the dashboard, so log output goes to a daily
//! rolling file instead of stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use pairdesk_core::LoggingConfig;

const LOG_FILE_PREFIX: &str = "pairdesk.log";

/// Directory used when the config does not name one.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pairdesk")
        .join("logs")
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(config: &LoggingConfig) -> Result<(WorkerGuard, PathBuf)> {
    let dir = config.directory.clone().unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let filter = build_filter(&config.level);
    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok((guard, dir))
}

/// `RUST_LOG` wins over the configured level; an unparsable level falls back to `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Path of today's log file, for the exit message.
pub fn log_file_hint(dir: &Path) -> String {
    format!("{}/{LOG_FILE_PREFIX}.*", dir.display())
}
