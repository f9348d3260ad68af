//! Memory engine capability trait.

use crate::error::EngineError;
use crate::options::{DeleteAllOptions, GetMemoriesOptions, SearchMemoriesOptions, StoreOptions};
use async_trait::async_trait;
use memgate_protocol::{DeleteResult, MemoryRecord, StoreResult, UpdateResult};

#[async_trait]
/// Operations offered by the external memory engine.
///
/// Implementations hold no per-call mutable state and are shared across
/// concurrent requests behind an `Arc`.
pub trait MemoryEngine: Send + Sync {
    /// Extract and persist facts from the given messages.
    async fn store(&self, options: StoreOptions) -> Result<StoreResult, EngineError>;

    /// List every record matching the scope, in engine order.
    async fn get_memories(
        &self,
        options: GetMemoriesOptions,
    ) -> Result<Vec<MemoryRecord>, EngineError>;

    /// Rank records in scope by relevance to the query, at most `limit`.
    async fn search_memories(
        &self,
        options: SearchMemoriesOptions,
    ) -> Result<Vec<MemoryRecord>, EngineError>;

    /// Replace a record's content.
    async fn update_memory(
        &self,
        memory_id: &str,
        new_content: &str,
    ) -> Result<UpdateResult, EngineError>;

    /// Delete a single record.
    async fn delete_memory(&self, memory_id: &str) -> Result<DeleteResult, EngineError>;

    /// Delete every record in a non-empty scope.
    async fn delete_all_memories(
        &self,
        options: DeleteAllOptions,
    ) -> Result<DeleteResult, EngineError>;

    /// Wipe the whole store.
    async fn reset(&self) -> Result<DeleteResult, EngineError>;
}
