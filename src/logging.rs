// src/logging.rs

//! Diagnostics go to stderr through `tracing`; stdout stays reserved for the
//! captured output of the commands being run.
//!
//! `--log-level` wins when given. Otherwise `CMDCAPTURE_LOG` is read as an
//! `EnvFilter` directive string, so both `debug` and
//! `cmdcapture::exec=trace,warn` work. With neither set only warnings and
//! errors (timeouts, launch failures, callback panics) are shown.

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "CMDCAPTURE_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::default().add_directive(LevelFilter::from(level).into()),
        None => EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .with_env_var(LOG_ENV)
            .from_env_lossy(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("installing tracing subscriber")
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}
