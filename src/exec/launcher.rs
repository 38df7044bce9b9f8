// src/exec/launcher.rs

//! Spawning one shell process for a command string.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::{CaptureError, Result};

/// Shell used to interpret command strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    program: String,
    arg: String,
}

impl Shell {
    pub fn new(program: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arg: arg.into(),
        }
    }

    /// Shell `program` with the platform's usual "run this string" flag.
    pub fn program(program: impl Into<String>) -> Self {
        Self::new(program, default_shell_arg())
    }

    pub fn program_name(&self) -> &str {
        &self.program
    }

    pub fn arg(&self) -> &str {
        &self.arg
    }
}

impl Default for Shell {
    fn default() -> Self {
        if cfg!(windows) {
            Shell::new("cmd", "/C")
        } else {
            Shell::new("sh", "-c")
        }
    }
}

pub(crate) fn default_shell_arg() -> &'static str {
    if cfg!(windows) { "/C" } else { "-c" }
}

/// A freshly spawned process with its stdin writer (if any).
pub struct LaunchedProcess {
    pub child: Child,
    pub pid: Option<u32>,
    pub stdin_writer: Option<JoinHandle<()>>,
}

/// Start `command` under `shell`.
///
/// - The child inherits the parent environment; `env` entries are set on top.
/// - stdout/stderr are always piped. stdin is piped only when `input` is
///   given, otherwise it is the null device.
/// - On unix the child leads a new process group so the whole tree can be
///   signalled on timeout.
pub fn launch(
    shell: &Shell,
    command: &str,
    cwd: Option<&Path>,
    env: &BTreeMap<String, String>,
    input: Option<Vec<u8>>,
) -> Result<LaunchedProcess> {
    if let Some(dir) = cwd {
        if !dir.is_dir() {
            return Err(CaptureError::LaunchFailure {
                command: command.to_string(),
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("working directory {} does not exist", dir.display()),
                ),
            });
        }
    }

    let mut cmd = Command::new(&shell.program);
    cmd.arg(&shell.arg).arg(command);

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.envs(env);

    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|source| CaptureError::LaunchFailure {
        command: command.to_string(),
        source,
    })?;

    let pid = child.id();
    info!(command = %command, pid = ?pid, cwd = ?cwd, "started process");

    let stdin_writer = match (input, child.stdin.take()) {
        (Some(data), Some(stdin)) => Some(spawn_stdin_writer(command, stdin, data)),
        _ => None,
    };

    Ok(LaunchedProcess {
        child,
        pid,
        stdin_writer,
    })
}

/// Write the whole payload, then drop the pipe so the child sees EOF.
fn spawn_stdin_writer(command: &str, mut stdin: ChildStdin, data: Vec<u8>) -> JoinHandle<()> {
    let command = command.to_string();
    tokio::spawn(async move {
        let res = async {
            stdin.write_all(&data).await?;
            stdin.shutdown().await
        }
        .await;

        match res {
            Ok(()) => debug!(command = %command, bytes = data.len(), "stdin payload written"),
            // A child that exits without reading its input closes the pipe first.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!(command = %command, "stdin closed by child before payload was consumed")
            }
            Err(e) => debug!(command = %command, error = %e, "writing stdin payload failed"),
        }
    })
}
