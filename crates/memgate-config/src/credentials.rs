//! Engine credential lookup.

use crate::ConfigError;
use log::debug;
use std::fmt;
use std::path::Path;

/// Environment variable that carries the engine API key by default.
pub const DEFAULT_API_KEY_ENV: &str = "MEM0_API_KEY";

/// Engine credential. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Resolve from the process environment, then from `<dir>/.env`.
    pub fn resolve(env_name: &str, dotenv_dir: &Path) -> Result<Self, ConfigError> {
        Self::resolve_with(env_name, |name| std::env::var(name).ok(), dotenv_dir)
    }

    /// Resolve using a custom environment lookup.
    pub fn resolve_with(
        env_name: &str,
        lookup: impl Fn(&str) -> Option<String>,
        dotenv_dir: &Path,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(env_name).filter(|value| !value.trim().is_empty()) {
            debug!("resolved credential from environment (name={env_name})");
            return Ok(Self::new(value.trim()));
        }
        if let Some(value) = read_dotenv(env_name, &dotenv_dir.join(".env"))? {
            debug!("resolved credential from .env (name={env_name})");
            return Ok(Self::new(value));
        }
        Err(ConfigError::MissingCredential(env_name.to_string()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Find `name` in a dotenv file without touching the process environment.
fn read_dotenv(name: &str, path: &Path) -> Result<Option<String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => return Ok(None),
        Err(err) => return Err(ConfigError::DotenvFailed(err.to_string())),
    };
    for item in iter {
        let (key, value) = item.map_err(|err| ConfigError::DotenvFailed(err.to_string()))?;
        if key == name && !value.trim().is_empty() {
            return Ok(Some(value.trim().to_string()));
        }
    }
    Ok(None)
}
