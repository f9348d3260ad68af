//! Request handling core for memgate.
//!
//! This crate owns request validation, the mapping into engine options,
//! orchestration of engine calls, and the translation of failures into
//! the uniform external error shape.

pub mod error;
pub mod handlers;
pub mod options;

pub use error::ApiError;
pub use handlers::MemoryHandlers;
