//! Logging setup: `tracing` events go to a daily-rolling file, never stdout
//!
//! Stdout carries the followed process log, so the subscriber only ever
//! writes to `<data_local_dir>/proclog/logs/proclog.log.<date>`.
//!
//! ```bash
//! PROCLOG_LOG=debug proclog 0b9f7c1e-...
//! PROCLOG_LOG=proclog_app=trace,proclog_client=debug proclog 0b9f7c1e-...
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "PROCLOG_LOG";

/// Filter used when `PROCLOG_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "proclog=info,warn";

const LOG_FILE_PREFIX: &str = "proclog.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Install the global subscriber
pub fn init() -> Result<()> {
    let log_dir = log_directory(dirs::data_local_dir().as_deref());
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        Error::config(format!(
            "Cannot create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let timer = fmt::time::ChronoLocal::new(TIMESTAMP_FORMAT.to_string());

    tracing_subscriber::registry()
        .with(env_filter(std::env::var(LOG_ENV_VAR).ok().as_deref()))
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(timer),
        )
        .init();

    tracing::info!(
        "proclog {} starting, logging to {}",
        env!("CARGO_PKG_VERSION"),
        log_dir.display()
    );
    Ok(())
}

/// `<base>/proclog/logs`, relative to the working directory without a base
fn log_directory(base: Option<&Path>) -> PathBuf {
    let base = base.unwrap_or_else(|| Path::new("."));
    base.join("proclog").join("logs")
}

/// Filter from the `PROCLOG_LOG` value, falling back to [`DEFAULT_FILTER`]
fn env_filter(value: Option<&str>) -> EnvFilter {
    value
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}
