// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The batch runner talks to a `CommandExecutor` instead of spawning
//! processes itself. Production code uses [`CommandCapture`]; tests can
//! provide an implementation that scripts delays and outcomes without
//! touching the OS.
//!
//! [`CommandCapture`]: crate::CommandCapture

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;

/// Trait abstracting how a single request is executed.
///
/// The returned future must own everything it needs (`'static`) so parallel
/// batches can hand it to `tokio::spawn`.
pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult>> + Send + 'static>>;
}
