//! Wire types shared by the memgate HTTP surface and the engine client.

mod memory;
mod request;

pub use memory::{
    DeleteResult, MemoryEvent, MemoryEventKind, MemoryRecord, MemoryScope, Message, StoreResult,
    UpdateResult,
};
pub use request::{
    SearchMemoriesRequest, StoreMemoryRequest, UpdateContentRequest, UpdateMemoryRequest,
};

use serde::{Deserialize, Serialize};

/// Free-form metadata attached to a memory record.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Uniform failure body returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// HTTP status code mirrored into the body.
    pub status: u16,
    /// Human readable cause.
    pub message: String,
}
