//! Capability interface to the external memory engine.
//!
//! The engine performs embedding, storage and ranking. This crate only
//! describes what can be asked of it and ships an HTTP binding for the
//! Mem0 REST API.

pub mod engine;
pub mod error;
pub mod http;
pub mod options;

/// Engine error type.
pub use error::EngineError;
/// Engine capability trait.
pub use engine::MemoryEngine;
/// Mem0 REST binding.
pub use http::HttpMemoryEngine;
/// Engine-ready request structures.
pub use options::{
    DEFAULT_SEARCH_LIMIT, DeleteAllOptions, GetMemoriesOptions, SearchMemoriesOptions,
    StoreOptions,
};
