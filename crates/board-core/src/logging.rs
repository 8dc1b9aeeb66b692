//! Tracing subscriber setup.
//!
//! Filter resolution: `BOARD_LOG` env > `log.level` from config > `warn`.
//! Output goes to stderr unless `log.file` is set.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::LogConfig;

pub const LOG_ENV: &str = "BOARD_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Builds the filter from the environment, falling back to `level`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        let level = level.trim();
        EnvFilter::try_new(if level.is_empty() { DEFAULT_LEVEL } else { level })
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
    })
}

/// Installs the global subscriber.
///
/// Returns the appender guard when logging to a file; keep it alive until
/// exit so buffered lines are flushed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(&config.level);

    match config.file.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Log file path has no file name: {file}"))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .try_init()
                .context("Failed to install tracing subscriber")?;
            Ok(None)
        }
    }
}
