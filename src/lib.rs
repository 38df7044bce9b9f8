// src/lib.rs

pub mod capture;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod request;
pub mod result;
pub mod types;

use anyhow::{Result, bail};
use tracing::debug;

use crate::cli::{BatchArgs, CliArgs, CliCommand, RunArgs};
use crate::config::{ConfigFile, load_and_validate};

pub use crate::capture::{CaptureOptions, CommandCapture};
pub use crate::errors::CaptureError;
pub use crate::exec::{CommandExecutor, Shell};
pub use crate::request::{ExecutionRequest, ProgressCallback};
pub use crate::result::ExecutionResult;
pub use crate::types::{BatchMode, BatchOptions, ExecutionState};

/// High-level entry point used by `main.rs`.
///
/// Loads the optional config, dispatches the subcommand and returns the exit
/// code the process should terminate with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => ConfigFile::default(),
    };
    debug!(?cfg, "configuration loaded");

    let capture = CommandCapture::from_config(&cfg);

    match args.command {
        CliCommand::Run(run_args) => run_one(&capture, run_args).await,
        CliCommand::Batch(batch_args) => run_many(&capture, &cfg, batch_args).await,
        CliCommand::Which { names } => Ok(which(&names)),
    }
}

async fn run_one(capture: &CommandCapture, args: RunArgs) -> Result<i32> {
    let mut request = ExecutionRequest::new(args.command).envs(args.env);
    if let Some(dir) = args.cwd {
        request = request.cwd(dir);
    }
    if let Some(t) = args.timeout {
        request = request.timeout_secs(t);
    }
    if let Some(input) = args.input {
        request = request.input(input);
    }
    if args.check {
        request = request.check(true);
    }
    if args.stream {
        request = request.on_line(|line| println!("{line}"));
    }

    match capture.run_request(request).await {
        Ok(result) => {
            if !args.stream {
                print!("{}", result.stdout());
            }
            eprint!("{}", result.stderr());
            eprintln!("{result}");
            Ok(exit_status_for(result.return_code()))
        }
        Err(err @ CaptureError::CommandFailure { .. }) => {
            eprintln!("{err}");
            Ok(exit_status_for(err.return_code().unwrap_or(1)))
        }
        Err(
            err @ (CaptureError::TimeoutFailure { .. }
            | CaptureError::LaunchFailure { .. }
            | CaptureError::InvalidRequest(_)),
        ) => {
            eprintln!("{err}");
            Ok(1)
        }
        Err(err) => Err(err.into()),
    }
}

async fn run_many(capture: &CommandCapture, cfg: &ConfigFile, args: BatchArgs) -> Result<i32> {
    let requests: Vec<ExecutionRequest> = if args.commands.is_empty() {
        cfg.command.iter().map(ExecutionRequest::from).collect()
    } else {
        args.commands.into_iter().map(ExecutionRequest::new).collect()
    };

    if requests.is_empty() {
        bail!("no commands given and no [[command]] entries in the config");
    }

    let options = BatchOptions {
        mode: if args.parallel {
            BatchMode::Parallel
        } else {
            cfg.batch.mode
        },
        fail_fast: args.fail_fast || cfg.batch.fail_fast,
    };

    let results = capture.run_batch(requests, options).await;

    let mut all_ok = true;
    for (idx, slot) in results.iter().enumerate() {
        match slot {
            Ok(result) => {
                all_ok &= result.success();
                println!("[{}] {result}", idx + 1);
                for line in result.stdout().lines() {
                    println!("    {line}");
                }
            }
            Err(err) => {
                all_ok = false;
                println!("[{}] error: {err}", idx + 1);
            }
        }
    }

    Ok(if all_ok { 0 } else { 1 })
}

fn which(names: &[String]) -> i32 {
    let mut all_found = true;
    for name in names {
        let available = CommandCapture::is_available(name);
        all_found &= available;
        println!(
            "{name}: {}",
            if available { "available" } else { "not available" }
        );
    }
    if all_found { 0 } else { 1 }
}

/// Map a return code onto a process exit status (0..=255).
///
/// Death by signal `N` (reported as `-N`) follows the shell convention
/// `128 + N`.
pub fn exit_status_for(return_code: i32) -> i32 {
    match return_code {
        0..=255 => return_code,
        n if n < 0 && n > -128 => 128 - n,
        _ => 1,
    }
}
