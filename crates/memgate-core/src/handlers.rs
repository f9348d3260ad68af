//! Request orchestration: validate, call the engine, translate failures.

use crate::error::ApiError;
use crate::options::{
    build_delete, build_delete_all_options, build_get_options, build_search_options,
    build_store_options, build_update,
};
use log::{debug, info, warn};
use memgate_engine::MemoryEngine;
use memgate_protocol::{
    DeleteResult, MemoryRecord, MemoryScope, SearchMemoriesRequest, StoreMemoryRequest,
    StoreResult, UpdateResult,
};
use std::sync::Arc;

/// Entry point for every memory operation exposed over HTTP.
///
/// Cheap to clone; all clones share one engine client.
#[derive(Clone)]
pub struct MemoryHandlers {
    engine: Arc<dyn MemoryEngine>,
}

impl MemoryHandlers {
    pub fn new(engine: Arc<dyn MemoryEngine>) -> Self {
        Self { engine }
    }

    pub async fn store(&self, request: StoreMemoryRequest) -> Result<StoreResult, ApiError> {
        let options = build_store_options(request)?;
        debug!(
            "storing memories (messages={}, scoped={})",
            options.messages.len(),
            !options.scope.is_empty()
        );
        let result = self.engine.store(options).await.map_err(log_engine_failure("store"))?;
        info!("memories stored (events={})", result.results.len());
        Ok(result)
    }

    pub async fn get_memories(&self, scope: MemoryScope) -> Result<Vec<MemoryRecord>, ApiError> {
        let options = build_get_options(scope);
        let records = self
            .engine
            .get_memories(options)
            .await
            .map_err(log_engine_failure("get_memories"))?;
        debug!("memories listed (count={})", records.len());
        Ok(records)
    }

    pub async fn search(
        &self,
        request: SearchMemoriesRequest,
    ) -> Result<Vec<MemoryRecord>, ApiError> {
        let options = build_search_options(request)?;
        debug!(
            "searching memories (query_len={}, limit={})",
            options.query.len(),
            options.limit
        );
        let records = self
            .engine
            .search_memories(options)
            .await
            .map_err(log_engine_failure("search_memories"))?;
        debug!("search finished (count={})", records.len());
        Ok(records)
    }

    pub async fn update(&self, memory_id: &str, data: &str) -> Result<UpdateResult, ApiError> {
        let (memory_id, data) = build_update(memory_id, data)?;
        let result = self
            .engine
            .update_memory(memory_id, data)
            .await
            .map_err(log_engine_failure("update_memory"))?;
        info!("memory updated (memory_id={})", memory_id);
        Ok(result)
    }

    pub async fn delete(&self, memory_id: &str) -> Result<DeleteResult, ApiError> {
        let memory_id = build_delete(memory_id)?;
        let result = self
            .engine
            .delete_memory(memory_id)
            .await
            .map_err(log_engine_failure("delete_memory"))?;
        info!("memory deleted (memory_id={})", memory_id);
        Ok(result)
    }

    /// Bulk delete within a scope. Refuses an empty scope.
    pub async fn delete_all(&self, scope: MemoryScope) -> Result<DeleteResult, ApiError> {
        let options = build_delete_all_options(scope)?;
        let filters = options
            .scope
            .pairs()
            .into_iter()
            .map(|(key, _)| key)
            .collect::<Vec<_>>()
            .join(",");
        let result = self
            .engine
            .delete_all_memories(options)
            .await
            .map_err(log_engine_failure("delete_all_memories"))?;
        info!("memories deleted in scope (filters={})", filters);
        Ok(result)
    }

    pub async fn reset(&self) -> Result<DeleteResult, ApiError> {
        warn!("resetting memory store");
        let result = self
            .engine
            .reset()
            .await
            .map_err(log_engine_failure("reset"))?;
        info!("memory store reset");
        Ok(result)
    }
}

fn log_engine_failure(operation: &'static str) -> impl Fn(memgate_engine::EngineError) -> ApiError {
    move |err| {
        warn!("engine call failed (operation={}, error={})", operation, err);
        ApiError::from(err)
    }
}
