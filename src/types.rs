use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How a batch of commands is executed.
///
/// - `Sequential`: one command after another, in input order (default).
/// - `Parallel`: every command launched at once; results are still returned
///   in input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    #[default]
    Sequential,
    Parallel,
}

impl BatchMode {
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            BatchMode::Parallel
        } else {
            BatchMode::Sequential
        }
    }
}

impl FromStr for BatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(BatchMode::Sequential),
            "parallel" => Ok(BatchMode::Parallel),
            other => Err(format!(
                "invalid batch mode: {other} (expected \"sequential\" or \"parallel\")"
            )),
        }
    }
}

/// Options for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchOptions {
    pub mode: BatchMode,

    /// Sequential mode only: once a slot ends in an error, the remaining
    /// slots are filled with `CaptureError::Skipped` instead of being run.
    pub fail_fast: bool,
}

impl BatchOptions {
    pub fn sequential() -> Self {
        Self::default()
    }

    pub fn parallel() -> Self {
        Self {
            mode: BatchMode::Parallel,
            fail_fast: false,
        }
    }

    pub fn fail_fast(mut self, val: bool) -> Self {
        self.fail_fast = val;
        self
    }
}

/// States of a single invocation.
///
/// `Pending -> Running -> {Completed, TimedOut, LaunchFailed}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Pending,
    Running,
    Completed,
    TimedOut,
    LaunchFailed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionState::Pending | ExecutionState::Running)
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionState::Pending => "pending",
            ExecutionState::Running => "running",
            ExecutionState::Completed => "completed",
            ExecutionState::TimedOut => "timed_out",
            ExecutionState::LaunchFailed => "launch_failed",
        };
        f.write_str(s)
    }
}
