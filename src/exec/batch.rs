// src/exec/batch.rs

//! Running many requests, sequentially or concurrently, keeping input order.

use std::time::Instant;

use tracing::{debug, info};

use crate::errors::{CaptureError, Result};
use crate::exec::backend::CommandExecutor;
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;
use crate::types::{BatchMode, BatchOptions};

/// Run every request through `executor`.
///
/// The output always has one slot per request, at the request's index:
///
/// - `Sequential`: requests run one after another. A failed slot does not
///   stop the rest, unless `fail_fast` is set, in which case every later slot
///   becomes `CaptureError::Skipped`.
/// - `Parallel`: every request is spawned at once and this returns only when
///   all of them reached a terminal state. `fail_fast` is ignored.
pub async fn run_batch<E>(
    executor: &E,
    requests: Vec<ExecutionRequest>,
    options: BatchOptions,
) -> Vec<Result<ExecutionResult>>
where
    E: CommandExecutor + ?Sized,
{
    let count = requests.len();
    let started = Instant::now();
    info!(count, mode = ?options.mode, fail_fast = options.fail_fast, "starting batch");

    let results = match options.mode {
        BatchMode::Sequential => run_sequential(executor, requests, options.fail_fast).await,
        BatchMode::Parallel => run_parallel(executor, requests).await,
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(
        count,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch finished"
    );

    results
}

async fn run_sequential<E>(
    executor: &E,
    requests: Vec<ExecutionRequest>,
    fail_fast: bool,
) -> Vec<Result<ExecutionResult>>
where
    E: CommandExecutor + ?Sized,
{
    let mut results = Vec::with_capacity(requests.len());
    let mut aborted = false;

    for (idx, request) in requests.into_iter().enumerate() {
        if aborted {
            debug!(index = idx, command = %request.command(), "skipping after earlier failure");
            results.push(Err(CaptureError::Skipped {
                command: request.command().to_string(),
            }));
            continue;
        }

        let result = executor.execute(request).await;
        if result.is_err() && fail_fast {
            aborted = true;
        }
        results.push(result);
    }

    results
}

async fn run_parallel<E>(executor: &E, requests: Vec<ExecutionRequest>) -> Vec<Result<ExecutionResult>>
where
    E: CommandExecutor + ?Sized,
{
    // Every task owns its own slot index; nothing else is shared.
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let command = request.command().to_string();
            (command, tokio::spawn(executor.execute(request)))
        })
        .collect();

    let mut slots: Vec<Option<Result<ExecutionResult>>> = (0..handles.len()).map(|_| None).collect();

    for (idx, (command, handle)) in handles.into_iter().enumerate() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(CaptureError::Other(anyhow::anyhow!(
                "invocation of '{command}' did not complete: {e}"
            ))),
        };
        debug!(index = idx, command = %command, ok = result.is_ok(), "batch slot filled");
        slots[idx] = Some(result);
    }

    slots.into_iter().flatten().collect()
}
