// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to launch '{command}': {source}")]
    LaunchFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed with return code {return_code}: {stderr}")]
    CommandFailure {
        command: String,
        return_code: i32,
        stderr: String,
    },

    #[error("Command '{command}' timed out after {timeout} seconds")]
    TimeoutFailure { command: String, timeout: f64 },

    #[error("Command '{command}' skipped after an earlier failure")]
    Skipped { command: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptureError {
    /// The command this error is about, if it concerns a single invocation.
    pub fn command(&self) -> Option<&str> {
        match self {
            CaptureError::LaunchFailure { command, .. }
            | CaptureError::CommandFailure { command, .. }
            | CaptureError::TimeoutFailure { command, .. }
            | CaptureError::Skipped { command } => Some(command),
            _ => None,
        }
    }

    /// Return code carried by a `CommandFailure`.
    pub fn return_code(&self) -> Option<i32> {
        match self {
            CaptureError::CommandFailure { return_code, .. } => Some(*return_code),
            _ => None,
        }
    }

    /// Configured timeout (seconds) carried by a `TimeoutFailure`.
    pub fn timeout(&self) -> Option<f64> {
        match self {
            CaptureError::TimeoutFailure { timeout, .. } => Some(*timeout),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CaptureError::TimeoutFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
