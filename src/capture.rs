// src/capture.rs

//! The `CommandCapture` facade and its shared defaults.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CommandConfig, ConfigFile};
use crate::errors::Result;
use crate::exec::backend::CommandExecutor;
use crate::exec::launcher::Shell;
use crate::exec::{availability, batch, deadline, invocation};
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;
use crate::types::{BatchMode, BatchOptions};

/// Defaults applied to every request run through a [`CommandCapture`].
///
/// A value set on the request always wins. The request's environment overlay
/// is layered over `env`, which is itself layered over the inherited
/// process environment.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub shell: Shell,
    pub grace_period: Duration,
    pub timeout: Option<f64>,
    pub check: bool,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            shell: Shell::default(),
            grace_period: deadline::DEFAULT_GRACE_PERIOD,
            timeout: None,
            check: false,
            cwd: None,
            env: BTreeMap::new(),
        }
    }
}

impl CaptureOptions {
    /// Build options from the `[capture]` and `[env]` sections.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let section = &cfg.capture;
        let shell = match (&section.shell, &section.shell_arg) {
            (Some(program), Some(arg)) => Shell::new(program, arg),
            (Some(program), None) => Shell::program(program),
            (None, Some(arg)) => Shell::new(Shell::default().program_name(), arg),
            (None, None) => Shell::default(),
        };

        Self {
            shell,
            grace_period: Duration::from_millis(section.grace_period_ms),
            timeout: section.timeout,
            check: section.check,
            cwd: section.cwd.clone(),
            env: cfg.env.clone(),
        }
    }

    /// Fill the unset fields of `request` from these defaults.
    pub(crate) fn apply_to(&self, mut request: ExecutionRequest) -> ExecutionRequest {
        if request.cwd.is_none() {
            request.cwd = self.cwd.clone();
        }
        if request.timeout.is_none() {
            request.timeout = self.timeout;
        }
        if request.check.is_none() {
            request.check = Some(self.check);
        }
        if !self.env.is_empty() {
            let mut env = self.env.clone();
            env.append(&mut request.env);
            request.env = env;
        }
        request
    }
}

/// Runs shell commands and captures their outcome.
///
/// Cheap to clone; clones share the same defaults.
///
/// ```no_run
/// # async fn demo() -> cmdcapture::errors::Result<()> {
/// use cmdcapture::CommandCapture;
///
/// let capture = CommandCapture::new();
/// let result = capture.run("echo 'Hello, World!'").await?;
/// assert!(result.success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandCapture {
    options: Arc<CaptureOptions>,
}

impl CommandCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CaptureOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::with_options(CaptureOptions::from_config(cfg))
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Run one command with the shared defaults.
    pub async fn run(&self, command: &str) -> Result<ExecutionResult> {
        self.run_request(ExecutionRequest::new(command)).await
    }

    pub async fn run_request(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        invocation::execute(&self.options, request).await
    }

    /// Run `commands` one after another or all at once.
    ///
    /// One slot per command, in input order. A failing command never removes
    /// or aborts its siblings.
    pub async fn run_multiple<S>(&self, commands: &[S], parallel: bool) -> Vec<Result<ExecutionResult>>
    where
        S: AsRef<str>,
    {
        let requests = commands
            .iter()
            .map(|c| ExecutionRequest::new(c.as_ref()))
            .collect();
        let options = BatchOptions {
            mode: BatchMode::from_parallel(parallel),
            fail_fast: false,
        };
        self.run_batch(requests, options).await
    }

    /// Like [`CommandCapture::run_multiple`], with per-command overrides.
    pub async fn run_batch(
        &self,
        requests: Vec<ExecutionRequest>,
        options: BatchOptions,
    ) -> Vec<Result<ExecutionResult>> {
        batch::run_batch(self, requests, options).await
    }

    /// Whether `name` resolves to an executable on `PATH`. Never fails.
    pub fn is_available(name: &str) -> bool {
        availability::is_available(name)
    }
}

impl CommandExecutor for CommandCapture {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult>> + Send + 'static>> {
        // Own the options so the future can outlive `self` (parallel batches
        // hand it to `tokio::spawn`).
        let options = Arc::clone(&self.options);
        Box::pin(async move { invocation::execute(&options, request).await })
    }
}

impl From<&CommandConfig> for ExecutionRequest {
    fn from(entry: &CommandConfig) -> Self {
        let mut req = ExecutionRequest::new(entry.cmd.clone()).envs(entry.env.clone());
        if let Some(dir) = &entry.cwd {
            req = req.cwd(dir.clone());
        }
        if let Some(t) = entry.timeout {
            req = req.timeout_secs(t);
        }
        if let Some(input) = &entry.input {
            req = req.input(input.clone());
        }
        if let Some(check) = entry.check {
            req = req.check(check);
        }
        req
    }
}
