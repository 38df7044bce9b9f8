// src/result.rs

use std::fmt;
use std::time::Duration;

/// Outcome of one completed invocation.
///
/// Produced exactly once, after the process exited and both output streams
/// reached end-of-stream. Timeouts and launch failures never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    command: String,
    return_code: i32,
    stdout: String,
    stderr: String,
    execution_time: Duration,
    pid: Option<u32>,
}

impl ExecutionResult {
    pub fn new(
        command: impl Into<String>,
        return_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        execution_time: Duration,
        pid: Option<u32>,
    ) -> Self {
        Self {
            command: command.into(),
            return_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            execution_time,
            pid,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Exit code of the process. On unix, termination by signal `N` is
    /// reported as `-N`.
    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    pub fn execution_time_secs(&self) -> f64 {
        self.execution_time.as_secs_f64()
    }

    /// Pid the process had while running. Diagnostics only.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CaptureResult(command='{}', return_code={}, success={}, execution_time={:.3}s)",
            self.command,
            self.return_code,
            self.success(),
            self.execution_time_secs()
        )
    }
}
