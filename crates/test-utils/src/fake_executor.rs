use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cmdcapture::errors::{CaptureError, Result};
use cmdcapture::exec::CommandExecutor;
use cmdcapture::{ExecutionRequest, ExecutionResult};

/// What the fake does when it sees a given command string.
#[derive(Debug, Clone)]
pub enum Script {
    /// Sleep, then succeed with `stdout`.
    Succeed { delay: Duration, stdout: String },
    /// Sleep, then exit with a non-zero code.
    Exit { delay: Duration, code: i32 },
    /// Sleep, then report a timeout.
    TimeOut { delay: Duration, timeout: f64 },
}

/// A fake executor that:
/// - records the order in which commands were started
/// - tracks how many invocations overlapped at most
/// - answers each command according to its `Script` (default: echo the
///   command string back immediately).
#[derive(Clone, Default)]
pub struct FakeExecutor {
    scripts: Arc<HashMap<String, Script>>,
    started: Arc<Mutex<Vec<String>>>,
    running: Arc<AtomicUsize>,
    max_running: Arc<AtomicUsize>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripts<I>(scripts: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Script)>,
    {
        Self {
            scripts: Arc::new(
                scripts
                    .into_iter()
                    .map(|(cmd, script)| (cmd.to_string(), script))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }
}

impl CommandExecutor for FakeExecutor {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult>> + Send + 'static>> {
        let command = request.command().to_string();
        let script = self.scripts.get(&command).cloned();
        let started = Arc::clone(&self.started);
        let running = Arc::clone(&self.running);
        let max_running = Arc::clone(&self.max_running);

        Box::pin(async move {
            started.lock().unwrap().push(command.clone());
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            max_running.fetch_max(now, Ordering::SeqCst);

            let outcome = match script {
                None => Ok(ExecutionResult::new(
                    command.clone(),
                    0,
                    command.clone(),
                    "",
                    Duration::ZERO,
                    None,
                )),
                Some(Script::Succeed { delay, stdout }) => {
                    tokio::time::sleep(delay).await;
                    Ok(ExecutionResult::new(command.clone(), 0, stdout, "", delay, None))
                }
                Some(Script::Exit { delay, code }) => {
                    tokio::time::sleep(delay).await;
                    Ok(ExecutionResult::new(command.clone(), code, "", "failed", delay, None))
                }
                Some(Script::TimeOut { delay, timeout }) => {
                    tokio::time::sleep(delay).await;
                    Err(CaptureError::TimeoutFailure {
                        command: command.clone(),
                        timeout,
                    })
                }
            };

            running.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }
}
