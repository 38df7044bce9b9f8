// src/exec/deadline.rs

//! Racing an invocation against its timeout and tearing down the process
//! tree when the timeout wins.

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::process::Child;
#[cfg(unix)]
use tracing::debug;
use tracing::{info, warn};

/// Default time between the polite and the forced termination.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Await `fut`, giving up after `limit`.
///
/// Returns `None` if the limit elapsed first; the future is dropped at that
/// point. Without a limit the future is awaited to completion.
pub async fn race<F>(limit: Option<Duration>, fut: F) -> Option<F::Output>
where
    F: Future,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Terminate `child` and everything it spawned, then reap it.
///
/// Unix: SIGTERM to the child's process group, up to `grace` for it to exit,
/// then SIGKILL to the group. The child must have been launched as a group
/// leader (see `launcher::launch`).
///
/// Windows: `taskkill /T /F` on the pid, with `Child::kill` as fallback.
///
/// `pid` is the pid recorded at launch. It is still used when the child has
/// already been reaped, since descendants may keep the group alive.
pub async fn terminate_tree(child: &mut Child, pid: Option<u32>, grace: Duration) -> io::Result<()> {
    let Some(pid) = pid.or_else(|| child.id()) else {
        return Ok(());
    };

    #[cfg(unix)]
    return terminate_group(child, pid, grace).await;

    #[cfg(windows)]
    return terminate_with_taskkill(child, pid).await;
}

#[cfg(unix)]
async fn terminate_group(child: &mut Child, pid: u32, grace: Duration) -> io::Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(pid as i32);

    info!(pid, "sending SIGTERM to process group");
    if let Err(e) = killpg(pgid, Signal::SIGTERM) {
        debug!(pid, error = %e, "SIGTERM to process group failed");
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => {
            let status = status?;
            debug!(pid, ?status, "process exited after SIGTERM");
            // Group members that ignored SIGTERM outlive the leader.
            let _ = killpg(pgid, Signal::SIGKILL);
            Ok(())
        }
        Err(_) => {
            warn!(
                pid,
                grace_ms = grace.as_millis() as u64,
                "process ignored SIGTERM; sending SIGKILL"
            );
            if let Err(e) = killpg(pgid, Signal::SIGKILL) {
                debug!(pid, error = %e, "SIGKILL to process group failed");
            }
            // Covers a leader that already left its group.
            child.kill().await
        }
    }
}

#[cfg(windows)]
async fn terminate_with_taskkill(child: &mut Child, pid: u32) -> io::Result<()> {
    info!(pid, "killing process tree with taskkill");
    let output = tokio::process::Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            child.wait().await?;
            Ok(())
        }
        Ok(out) => {
            warn!(
                pid,
                stderr = %String::from_utf8_lossy(&out.stderr),
                "taskkill failed; killing process directly"
            );
            child.kill().await
        }
        Err(e) => {
            warn!(pid, error = %e, "taskkill unavailable; killing process directly");
            child.kill().await
        }
    }
}
