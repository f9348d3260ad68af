//! Configuration models, loading, and credential resolution.
//!
//! This crate owns the memgate config schema and the lookup of the engine
//! credential used by the server binary.

mod credentials;
mod error;
mod loader;
mod model;

/// Engine credential resolved at startup.
pub use credentials::{Credentials, DEFAULT_API_KEY_ENV};
/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Default config filename discovered in the working directory.
pub use loader::DEFAULT_CONFIG_FILE;
/// Configuration schema models.
pub use model::*;
