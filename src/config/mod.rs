// src/config/mod.rs

//! Configuration loading and validation for cmdcapture.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate timeouts, grace period and batch entries (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{BatchSection, CaptureSection, CommandConfig, ConfigFile, RawConfigFile};
