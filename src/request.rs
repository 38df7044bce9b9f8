// src/request.rs

//! Inputs for a single invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::{CaptureError, Result};

/// Sink for stdout lines as they arrive.
///
/// The callback runs on a blocking worker thread, never on the task that
/// called `run`. It is invoked for one line at a time, in arrival order.
///
/// A panic inside it is caught, logged at `warn`, and the next line is still
/// delivered. The process-wide panic hook runs before the panic is caught, so
/// the default hook still prints its `thread '..' panicked` message; install
/// a quieter hook with [`std::panic::set_hook`] if that output is unwanted.
///
/// Every call has returned by the time `run` returns, whether the command
/// completed or timed out. Lines still queued when a timeout fires are
/// dropped.
#[derive(Clone)]
pub struct ProgressCallback(Arc<dyn Fn(&str) + Send + Sync>);

impl ProgressCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, line: &str) {
        (self.0)(line)
    }
}

impl fmt::Debug for ProgressCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressCallback(..)")
    }
}

/// Everything needed to run one command.
///
/// Built with a consuming builder:
///
/// ```no_run
/// use cmdcapture::ExecutionRequest;
///
/// let req = ExecutionRequest::new("echo $GREETING")
///     .env("GREETING", "hello")
///     .cwd("/tmp")
///     .timeout_secs(5.0)
///     .check(true);
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub(crate) command: String,
    pub(crate) cwd: Option<PathBuf>,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) timeout: Option<f64>,
    pub(crate) input: Option<Vec<u8>>,
    pub(crate) progress: Option<ProgressCallback>,
    pub(crate) check: Option<bool>,
}

impl ExecutionRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
            env: BTreeMap::new(),
            timeout: None,
            input: None,
            progress: None,
            check: None,
        }
    }

    /// Working directory for the child. Must exist when the command launches.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Set one variable on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Timeout in seconds. Must be positive and finite; checked by
    /// [`ExecutionRequest::validate`].
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout = Some(secs);
        self
    }

    pub fn timeout(self, limit: Duration) -> Self {
        self.timeout_secs(limit.as_secs_f64())
    }

    /// Bytes written to the child's stdin, after which stdin is closed.
    pub fn input(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.input = Some(data.into());
        self
    }

    pub fn on_line<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.progress = Some(ProgressCallback::new(f));
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Treat a non-zero exit as `CaptureError::CommandFailure`.
    pub fn check(mut self, val: bool) -> Self {
        self.check = Some(val);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn env_overlay(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn timeout_value(&self) -> Option<f64> {
        self.timeout
    }

    pub fn input_payload(&self) -> Option<&[u8]> {
        self.input.as_deref()
    }

    /// Reject requests that must never reach the launcher.
    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(CaptureError::InvalidRequest(
                "command must not be empty".to_string(),
            ));
        }
        if let Some(t) = self.timeout {
            validate_timeout(t)?;
        }
        Ok(())
    }
}

impl From<&str> for ExecutionRequest {
    fn from(command: &str) -> Self {
        ExecutionRequest::new(command)
    }
}

impl From<String> for ExecutionRequest {
    fn from(command: String) -> Self {
        ExecutionRequest::new(command)
    }
}

pub(crate) fn validate_timeout(secs: f64) -> Result<()> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(CaptureError::InvalidRequest(format!(
            "timeout must be a positive number of seconds (got {secs})"
        )));
    }
    // Duration::from_secs_f64 panics past u64::MAX seconds.
    if Duration::try_from_secs_f64(secs).is_err() {
        return Err(CaptureError::InvalidRequest(format!(
            "timeout out of range: {secs}"
        )));
    }
    Ok(())
}
