//! Inbound request bodies for the HTTP surface.
//!
//! Required fields default to empty values on decode so that a missing field
//! is reported by validation with a precise message rather than by the JSON
//! decoder.

use crate::{MemoryScope, Message, Metadata};
use serde::{Deserialize, Serialize};

/// Body of `POST /memories/store`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreMemoryRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub scope: MemoryScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Body of `POST /memories/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchMemoriesRequest {
    #[serde(default)]
    pub query: String,
    #[serde(flatten)]
    pub scope: MemoryScope,
    /// Signed so that non-positive values reach validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Body of `POST /memories/update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateMemoryRequest {
    #[serde(default)]
    pub memory_id: String,
    #[serde(default)]
    pub data: String,
}

/// Body of `PUT /memories/{memory_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateContentRequest {
    #[serde(default)]
    pub data: String,
}
