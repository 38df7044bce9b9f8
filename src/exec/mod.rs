// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running command strings through
//! the host shell with `tokio::process::Command` and turning what happens
//! into an `ExecutionResult` or a `CaptureError`.
//!
//! - [`launcher`] spawns the shell process (cwd, env overlay, stdin payload).
//! - [`streamer`] drains stdout/stderr and feeds the progress callback.
//! - [`deadline`] races completion against the timeout and tears down the
//!   process tree.
//! - [`invocation`] drives one request through its states.
//! - [`batch`] runs many requests and keeps them in input order.
//! - [`backend`] provides the `CommandExecutor` trait the batch runner uses,
//!   which tests can replace with a fake implementation.
//! - [`availability`] looks executables up on `PATH`.

pub mod availability;
pub mod backend;
pub mod batch;
pub mod deadline;
pub mod invocation;
pub mod launcher;
pub mod streamer;

pub use availability::is_available;
pub use backend::CommandExecutor;
pub use batch::run_batch;
pub use launcher::Shell;
