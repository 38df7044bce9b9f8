// src/exec/streamer.rs

//! Concurrent draining of a child's stdout and stderr.
//!
//! Each stream gets its own Tokio task, so a child that fills one pipe while
//! the other is idle can never deadlock the capture. The stdout drain can
//! additionally forward complete lines to a [`ProgressCallback`]:
//!
//! - lines are pushed onto an unbounded channel by the drain;
//! - a consumer on a blocking thread calls the callback for each line;
//! - a panic in the callback is logged and the next line is still delivered.
//!
//! Draining and delivery finish separately: [`OutputDrains::collect`] only
//! waits for end-of-stream, [`OutputDrains::finish_progress`] waits for the
//! callback to catch up, and [`OutputDrains::cancel`] stops delivery early.
//!
//! Line policy: split on `\n`, drop the `\n` and one preceding `\r`, and
//! deliver a non-empty unterminated tail as the last line.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::request::ProgressCallback;

/// Fully materialized output of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Running drains for one invocation.
pub struct OutputDrains {
    command: String,
    stdout: Option<JoinHandle<Vec<u8>>>,
    stderr: Option<JoinHandle<Vec<u8>>>,
    progress: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl OutputDrains {
    /// Spawn the drains. Missing pipes simply produce empty output.
    pub fn start(
        command: &str,
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
        progress: Option<ProgressCallback>,
    ) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (line_tx, progress) = match progress {
            Some(callback) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let consumer = spawn_progress_consumer(command, rx, callback, Arc::clone(&cancelled));
                (Some(tx), Some(consumer))
            }
            None => (None, None),
        };

        let stdout = stdout.map(|out| {
            let command = command.to_string();
            tokio::spawn(async move {
                let buf = drain_stream(out, line_tx.as_ref()).await;
                debug!(command = %command, bytes = buf.len(), "stdout drain ended");
                buf
            })
        });

        let stderr = stderr.map(|err| {
            let command = command.to_string();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut reader = BufReader::new(err);
                if let Err(e) = reader.read_to_end(&mut buf).await {
                    warn!(command = %command, error = %e, "reading stderr failed");
                }
                debug!(command = %command, bytes = buf.len(), "stderr drain ended");
                buf
            })
        });

        Self {
            command: command.to_string(),
            stdout,
            stderr,
            progress,
            cancelled,
        }
    }

    /// Wait until both streams hit end-of-stream.
    ///
    /// Lines may still be queued for the callback when this returns.
    pub async fn collect(&mut self) -> CapturedOutput {
        let stdout = join_drain(&self.command, "stdout", &mut self.stdout).await;
        let stderr = join_drain(&self.command, "stderr", &mut self.stderr).await;

        CapturedOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        }
    }

    /// Wait until every line read so far has been handed to the callback.
    ///
    /// Call after [`OutputDrains::collect`]; the consumer only ends once the
    /// stdout drain has dropped its sender.
    pub async fn finish_progress(&mut self) {
        if let Some(progress) = self.progress.take() {
            if let Err(e) = progress.await {
                warn!(command = %self.command, error = %e, "progress consumer failed");
            }
        }
    }

    /// Stop draining and stop delivering lines.
    ///
    /// Returns once no callback is running and none will start, so the caller
    /// may report the invocation as finished.
    pub async fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        for handle in [self.stdout.take(), self.stderr.take()].into_iter().flatten() {
            handle.abort();
            // Dropping the aborted stdout task drops the line sender.
            let _ = handle.await;
        }
        self.finish_progress().await;
    }
}

/// Await a drain in place, so a cancelled `collect` leaves the handle behind
/// for [`OutputDrains::cancel`] to abort.
async fn join_drain(command: &str, stream: &str, slot: &mut Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    let Some(handle) = slot.as_mut() else {
        return Vec::new();
    };
    let joined = handle.await;
    *slot = None;
    match joined {
        Ok(buf) => buf,
        Err(e) => {
            warn!(command = %command, stream, error = %e, "drain task failed");
            Vec::new()
        }
    }
}

/// Read `reader` to end-of-stream, returning every byte read.
///
/// When `lines` is given, each line (see the module docs for the policy) is
/// sent to it as soon as it is complete. A closed receiver stops line
/// forwarding but not the drain itself.
pub async fn drain_stream<R>(reader: R, lines: Option<&mpsc::UnboundedSender<String>>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                buf.extend_from_slice(&line);
                if let Some(tx) = lines {
                    let _ = tx.send(strip_line_ending(&line));
                }
            }
            Err(e) => {
                buf.extend_from_slice(&line);
                warn!(error = %e, "reading stdout failed; keeping partial output");
                break;
            }
        }
    }

    buf
}

/// Decode one raw line, dropping a trailing `\n` and the `\r` before it.
pub fn strip_line_ending(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
        if end > 0 && raw[end - 1] == b'\r' {
            end -= 1;
        }
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn spawn_progress_consumer(
    command: &str,
    mut rx: mpsc::UnboundedReceiver<String>,
    callback: ProgressCallback,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<()> {
    let command = command.to_string();
    tokio::task::spawn_blocking(move || {
        let mut delivered = 0usize;
        while let Some(line) = rx.blocking_recv() {
            if cancelled.load(Ordering::SeqCst) {
                debug!(command = %command, delivered, "progress delivery cancelled");
                return;
            }
            if catch_unwind(AssertUnwindSafe(|| callback.call(&line))).is_err() {
                warn!(command = %command, line = %line, "progress callback panicked; continuing");
            }
            delivered += 1;
        }
        debug!(command = %command, delivered, "progress consumer ended");
    })
}
