//! Logging configuration using tracing.
//!
//! The terminal belongs to the TUI, so logs go to a daily rolling file under
//! `<data_local_dir>/playground-cli/logs/`. Level is controlled by the
//! `PLAYGROUND_LOG` environment variable:
//!
//! ```bash
//! PLAYGROUND_LOG=debug playground-cli
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "playground.log";

/// Initialize the logging subsystem.
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let env_filter = EnvFilter::try_from_env("PLAYGROUND_LOG")
        .unwrap_or_else(|_| EnvFilter::new("playground_cli=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()
        .context("install tracing subscriber")?;

    tracing::info!("playground-cli {} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(log_dir)
}

fn log_directory() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("playground-cli").join("logs")
}
