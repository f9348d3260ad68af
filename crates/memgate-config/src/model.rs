//! Configuration schema for memgate.

use crate::credentials::DEFAULT_API_KEY_ENV;
use serde::{Deserialize, Serialize};

/// Root config for the memgate server.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MemgateConfig {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl MemgateConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MemgateConfigBuilder {
        MemgateConfigBuilder::new()
    }
}

/// Builder for assembling a `MemgateConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MemgateConfigBuilder {
    config: MemgateConfig,
}

impl MemgateConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MemgateConfig::default(),
        }
    }

    /// Replace the server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the engine configuration.
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    /// Finalize and return the built `MemgateConfig`.
    pub fn build(self) -> MemgateConfig {
        self.config
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Upper bound on a single request, engine call included.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Mount `POST /memories/reset`.
    #[serde(default)]
    pub allow_reset: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_secs: default_request_timeout_secs(),
            allow_reset: false,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Memory engine connection settings. The API key is never read from file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_engine_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Response format requested from the engine, e.g. `v1.1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_engine_timeout_secs(),
            organization_id: None,
            project_id: None,
            output_format: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl EngineConfig {
    /// Engine config pointed at a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

fn default_base_url() -> String {
    "https://api.mem0.ai/v1".to_string()
}

fn default_engine_timeout_secs() -> u64 {
    10
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}
