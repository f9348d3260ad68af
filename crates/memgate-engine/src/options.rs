//! Request structures handed to a `MemoryEngine`.
//!
//! These are produced by validation upstream; the engine may assume their
//! invariants hold.

use memgate_protocol::{MemoryScope, Message, Metadata};

/// Search limit used when the caller does not supply one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Store one or more messages for fact extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// At least one message, each with non-empty role and content.
    pub messages: Vec<Message>,
    pub scope: MemoryScope,
    /// Never absent; empty when the caller sent none.
    pub metadata: Metadata,
}

/// Filter for listing records. An empty scope means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMemoriesOptions {
    pub scope: MemoryScope,
}

/// Semantic search restricted to a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMemoriesOptions {
    /// Non-empty query text.
    pub query: String,
    pub scope: MemoryScope,
    /// Positive upper bound on returned records.
    pub limit: u32,
}

/// Bulk delete. The scope always carries at least one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAllOptions {
    pub scope: MemoryScope,
}
