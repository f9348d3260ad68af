//! Tests for config loading.

use super::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Verify that a minimal config parses with defaults.
#[test]
fn parse_minimal_config() {
    let config = MemgateConfig::load_from_str("{}").expect("config");
    assert_eq!(config.server.bind, "127.0.0.1:8080");
    assert_eq!(config.server.request_timeout_secs, 30);
    assert!(!config.server.allow_reset);
    assert_eq!(config.engine.base_url, "https://api.mem0.ai/v1");
    assert_eq!(config.engine.timeout_secs, 10);
    assert_eq!(config.engine.api_key_env, "MEM0_API_KEY");
}

/// JSON5 syntax (comments, unquoted keys, trailing commas) is accepted.
#[test]
fn parse_json5_overrides() {
    let json5 = r#"{
        // local engine
        engine: { base_url: "http://localhost:8888/v1", output_format: "v1.1", },
        server: { allow_reset: true },
    }"#;
    let config = MemgateConfig::load_from_str(json5).expect("config");
    assert_eq!(config.engine.base_url, "http://localhost:8888/v1");
    assert_eq!(config.engine.output_format.as_deref(), Some("v1.1"));
    assert!(config.server.allow_reset);
}

/// Reject unexpected config keys.
#[test]
fn rejects_unknown_key() {
    let err = MemgateConfig::load_from_str(r#"{ engine: { api_key: "nope" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("unknown field"), "{msg}");
}

/// Reject a bind address that is not host:port.
#[test]
fn rejects_invalid_bind() {
    let err = MemgateConfig::load_from_str(r#"{ server: { bind: "localhost" } }"#).unwrap_err();
    let msg = format!("{err}");
    assert!(msg.contains("server.bind"), "{msg}");
}

/// Reject a zero engine timeout and a non-http base URL.
#[test]
fn rejects_invalid_engine_settings() {
    let err = MemgateConfig::load_from_str(r#"{ engine: { timeout_secs: 0 } }"#).unwrap_err();
    assert!(format!("{err}").contains("engine.timeout_secs"));

    let err =
        MemgateConfig::load_from_str(r#"{ engine: { base_url: "ftp://x" } }"#).unwrap_err();
    assert!(format!("{err}").contains("engine.base_url"));
}

/// A config in the working directory is discovered; otherwise defaults apply.
#[test]
fn discovers_config_in_cwd() {
    let temp = TempDir::new().expect("tmp");
    let config = MemgateConfig::load_discovered(temp.path()).expect("defaults");
    assert_eq!(config, MemgateConfig::default());

    fs::write(
        temp.path().join(DEFAULT_CONFIG_FILE),
        r#"{ server: { bind: "0.0.0.0:9000" } }"#,
    )
    .expect("write");
    let config = MemgateConfig::load_discovered(temp.path()).expect("discovered");
    assert_eq!(config.server.bind, "0.0.0.0:9000");
}
