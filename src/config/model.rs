// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::types::BatchMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [capture]
/// grace_period_ms = 2000
/// timeout = 30.0
///
/// [env]
/// FOO = "bar"
///
/// [batch]
/// mode = "parallel"
///
/// [[command]]
/// cmd = "echo one"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub capture: CaptureSection,

    /// Default environment overlay applied to every command.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub batch: BatchSection,

    /// Batch entries from `[[command]]`, in file order.
    #[serde(default)]
    pub command: Vec<CommandConfig>,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub capture: CaptureSection,
    pub env: BTreeMap<String, String>,
    pub batch: BatchSection,
    pub command: Vec<CommandConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            capture: raw.capture,
            env: raw.env,
            batch: raw.batch,
            command: raw.command,
        }
    }
}

/// `[capture]` section: defaults shared by every invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureSection {
    /// Shell program used to interpret command strings.
    ///
    /// If `None`, `sh` on unix and `cmd` on windows.
    #[serde(default)]
    pub shell: Option<String>,

    /// Flag passed to the shell before the command string (`-c` / `/C`).
    #[serde(default)]
    pub shell_arg: Option<String>,

    /// How long a timed-out process gets between SIGTERM and SIGKILL.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Default timeout in seconds; `None` means unbounded.
    #[serde(default)]
    pub timeout: Option<f64>,

    #[serde(default)]
    pub check: bool,

    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

fn default_grace_period_ms() -> u64 {
    2000
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            shell: None,
            shell_arg: None,
            grace_period_ms: default_grace_period_ms(),
            timeout: None,
            check: false,
            cwd: None,
        }
    }
}

/// `[batch]` section.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct BatchSection {
    #[serde(default)]
    pub mode: BatchMode,

    #[serde(default)]
    pub fail_fast: bool,
}

/// One `[[command]]` entry.
///
/// Every field except `cmd` falls back to the `[capture]` / `[env]` defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub cmd: String,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Layered over the top-level `[env]` table.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub timeout: Option<f64>,

    /// Text written to stdin.
    #[serde(default)]
    pub input: Option<String>,

    #[serde(default)]
    pub check: Option<bool>,
}
