// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cmdcapture`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdcapture",
    version,
    about = "Run shell commands and capture their exit status, output and timing.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional config file (TOML) with defaults and `[[command]]` entries.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDCAPTURE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run one command and print what it produced.
    Run(RunArgs),

    /// Run several commands, or the `[[command]]` entries of the config.
    Batch(BatchArgs),

    /// Report whether executables can be found on PATH.
    Which {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Command string, interpreted by the shell.
    pub command: String,

    /// Timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Working directory.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable, may be repeated.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Text written to the command's stdin.
    #[arg(long, value_name = "TEXT")]
    pub input: Option<String>,

    /// Fail on a non-zero exit code.
    #[arg(long)]
    pub check: bool,

    /// Print stdout lines as they arrive.
    #[arg(long)]
    pub stream: bool,
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// Command strings. If empty, `[[command]]` entries from `--config` run.
    pub commands: Vec<String>,

    /// Run all commands at once.
    #[arg(long)]
    pub parallel: bool,

    /// Sequential mode: skip the remaining commands after the first error.
    #[arg(long)]
    pub fail_fast: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
