// src/exec/invocation.rs

//! One invocation, start to terminal state.

use std::process::ExitStatus;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::capture::CaptureOptions;
use crate::errors::{CaptureError, Result};
use crate::exec::deadline;
use crate::exec::launcher::{self, LaunchedProcess};
use crate::exec::streamer::OutputDrains;
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;
use crate::types::ExecutionState;

/// Run `request` with `options` filling in whatever the request left unset.
///
/// - Launch failure and timeout are errors; no result is produced for them.
/// - A non-zero exit is a result with `success() == false`, unless `check`
///   is set, in which case it becomes `CaptureError::CommandFailure`.
pub async fn execute(options: &CaptureOptions, request: ExecutionRequest) -> Result<ExecutionResult> {
    let request = options.apply_to(request);
    request.validate()?;

    let ExecutionRequest {
        command,
        cwd,
        env,
        timeout,
        input,
        progress,
        check,
    } = request;
    let check = check.unwrap_or(false);

    let mut state = ExecutionState::Pending;
    let start = Instant::now();

    let launched = launcher::launch(&options.shell, &command, cwd.as_deref(), &env, input);
    let LaunchedProcess {
        mut child,
        pid,
        stdin_writer,
    } = match launched {
        Ok(launched) => launched,
        Err(err) => {
            transition(&command, &mut state, ExecutionState::LaunchFailed);
            warn!(command = %command, error = %err, "launch failed");
            return Err(err);
        }
    };
    transition(&command, &mut state, ExecutionState::Running);

    let mut drains = OutputDrains::start(
        &command,
        child.stdout.take(),
        child.stderr.take(),
        progress,
    );

    // Exit alone is not completion: both pipes must also reach EOF. Callback
    // delivery is not raced; a slow callback never turns into a timeout.
    let limit = timeout.map(Duration::from_secs_f64);
    let outcome = deadline::race(limit, async {
        let status = child.wait().await;
        let output = drains.collect().await;
        (status, output)
    })
    .await;

    if let Some(writer) = stdin_writer {
        writer.abort();
    }

    let Some((status, output)) = outcome else {
        drains.cancel().await;
        if let Err(e) = deadline::terminate_tree(&mut child, pid, options.grace_period).await {
            warn!(command = %command, pid = ?pid, error = %e, "terminating timed-out process failed");
        }
        transition(&command, &mut state, ExecutionState::TimedOut);
        let elapsed = start.elapsed();
        warn!(
            command = %command,
            pid = ?pid,
            elapsed_ms = elapsed.as_millis() as u64,
            timeout_secs = timeout.unwrap_or_default(),
            "command timed out"
        );
        return Err(CaptureError::TimeoutFailure {
            command,
            timeout: timeout.unwrap_or_default(),
        });
    };

    let execution_time = start.elapsed();
    drains.finish_progress().await;
    let status = status?;
    transition(&command, &mut state, ExecutionState::Completed);

    let return_code = exit_code(status);
    info!(
        command = %command,
        pid = ?pid,
        exit_code = return_code,
        success = return_code == 0,
        elapsed_ms = execution_time.as_millis() as u64,
        "process exited"
    );

    if check && return_code != 0 {
        return Err(CaptureError::CommandFailure {
            command,
            return_code,
            stderr: output.stderr,
        });
    }

    Ok(ExecutionResult::new(
        command,
        return_code,
        output.stdout,
        output.stderr,
        execution_time,
        pid,
    ))
}

fn transition(command: &str, state: &mut ExecutionState, next: ExecutionState) {
    debug_assert!(!state.is_terminal(), "transition out of terminal state {state}");
    debug!(command = %command, from = %state, to = %next, "invocation state change");
    *state = next;
}

/// Native exit code, `-N` for death by signal `N` on unix, `-1` otherwise.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }

    -1
}
