// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Parse a `cmdcapture` TOML file without checking any values.
///
/// Missing sections fall back to their defaults, so an empty file yields the
/// same configuration as running without `--config`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&contents)?)
}

/// Parse and check a config file: positive timeouts and grace period, a
/// non-empty shell, and a non-empty `cmd` in every `[[command]]`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    ConfigFile::try_from(load_from_path(path)?)
}
