#![allow(dead_code)]

use std::collections::BTreeMap;

use cmdcapture::config::{
    BatchSection, CaptureSection, CommandConfig, ConfigFile, RawConfigFile,
};
use cmdcapture::types::BatchMode;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                capture: CaptureSection::default(),
                env: BTreeMap::new(),
                batch: BatchSection::default(),
                command: vec![],
            },
        }
    }

    pub fn with_command(mut self, command: CommandConfig) -> Self {
        self.config.command.push(command);
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.config.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_timeout(mut self, secs: f64) -> Self {
        self.config.capture.timeout = Some(secs);
        self
    }

    pub fn with_grace_period_ms(mut self, ms: u64) -> Self {
        self.config.capture.grace_period_ms = ms;
        self
    }

    pub fn with_check(mut self, val: bool) -> Self {
        self.config.capture.check = val;
        self
    }

    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.config.batch.mode = mode;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one `[[command]]` entry.
pub struct CommandConfigBuilder {
    command: CommandConfig,
}

impl CommandConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            command: CommandConfig {
                cmd: cmd.to_string(),
                cwd: None,
                env: BTreeMap::new(),
                timeout: None,
                input: None,
                check: None,
            },
        }
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.command.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.command.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn timeout(mut self, secs: f64) -> Self {
        self.command.timeout = Some(secs);
        self
    }

    pub fn input(mut self, text: &str) -> Self {
        self.command.input = Some(text.to_string());
        self
    }

    pub fn check(mut self, val: bool) -> Self {
        self.command.check = Some(val);
        self
    }

    pub fn build(self) -> CommandConfig {
        self.command
    }
}
