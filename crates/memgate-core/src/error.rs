//! Translation of internal failures into external errors.

use memgate_engine::EngineError;
use memgate_protocol::ErrorBody;
use thiserror::Error;

/// Failure returned by every request handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Caller input violated a constraint.
    #[error("{0}")]
    Validation(String),
    /// The referenced memory does not exist.
    #[error("memory not found: {0}")]
    NotFound(String),
    /// The engine failed or could not be reached.
    #[error("{0}")]
    Engine(String),
}

impl ApiError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status for this failure.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Engine(_) => 500,
        }
    }

    /// Uniform `{status, message}` body.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status(),
            message: self.to_string(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(memory_id) => ApiError::NotFound(memory_id),
            other => ApiError::Engine(other.to_string()),
        }
    }
}
