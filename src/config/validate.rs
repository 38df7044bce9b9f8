// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CaptureError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CaptureError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_capture_section(cfg)?;
    validate_commands(cfg)?;
    Ok(())
}

fn validate_capture_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.capture.grace_period_ms == 0 {
        return Err(CaptureError::ConfigError(
            "[capture].grace_period_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(t) = cfg.capture.timeout {
        check_timeout("[capture].timeout", t)?;
    }

    if let Some(shell) = &cfg.capture.shell {
        if shell.trim().is_empty() {
            return Err(CaptureError::ConfigError(
                "[capture].shell must not be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_commands(cfg: &RawConfigFile) -> Result<()> {
    for (idx, entry) in cfg.command.iter().enumerate() {
        if entry.cmd.trim().is_empty() {
            return Err(CaptureError::ConfigError(format!(
                "[[command]] #{} has an empty `cmd`",
                idx + 1
            )));
        }
        if let Some(t) = entry.timeout {
            check_timeout(&format!("[[command]] #{} timeout", idx + 1), t)?;
        }
    }
    Ok(())
}

fn check_timeout(what: &str, secs: f64) -> Result<()> {
    crate::request::validate_timeout(secs).map_err(|_| {
        CaptureError::ConfigError(format!(
            "{what} must be a positive number of seconds (got {secs})"
        ))
    })
}
