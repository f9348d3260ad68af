//! Config file loading and validation.
//!
//! A config is read from an explicit path, or discovered as
//! `memgate.json5` in the working directory. Without a file the defaults
//! apply. Every loaded config is validated before it is returned.

#[cfg(test)]
mod tests;

use crate::{ConfigError, MemgateConfig};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Default config filename in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "memgate.json5";

impl MemgateConfig {
    /// Load a single config from a path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value)
    }

    /// Load `memgate.json5` from `cwd` when present, defaults otherwise.
    pub fn load_discovered(cwd: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = cwd.as_ref().join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            return Self::load_from_path(path);
        }
        debug!(
            "no config file found; using defaults (cwd={})",
            cwd.as_ref().display()
        );
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_field(
                "server.bind",
                format!("expected host:port socket address, got `{}`", self.server.bind),
            ));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::invalid_field(
                "server.request_timeout_secs",
                "must be greater than zero",
            ));
        }

        let base_url = self.engine.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::invalid_field(
                "engine.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.engine.timeout_secs == 0 {
            return Err(ConfigError::invalid_field(
                "engine.timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.engine.api_key_env.trim().is_empty() {
            return Err(ConfigError::invalid_field(
                "engine.api_key_env",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

fn config_from_value(value: Value) -> Result<MemgateConfig, ConfigError> {
    let config: MemgateConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
