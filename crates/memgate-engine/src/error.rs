//! Error types for engine calls.

/// Errors surfaced by a memory engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The referenced memory does not exist.
    #[error("memory not found: {0}")]
    NotFound(String),
    /// The engine answered with a failure status.
    #[error("engine error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// The engine could not be reached or the call timed out.
    #[error("engine request failed: {0}")]
    Transport(String),
    /// The engine answered with a body that could not be decoded.
    #[error("failed to decode engine response: {0}")]
    Decode(String),
    /// The client could not be built from its configuration.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}
