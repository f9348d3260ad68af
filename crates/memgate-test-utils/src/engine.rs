use async_trait::async_trait;
use memgate_engine::{
    DeleteAllOptions, EngineError, GetMemoriesOptions, MemoryEngine, SearchMemoriesOptions,
    StoreOptions,
};
use memgate_protocol::{
    DeleteResult, MemoryEvent, MemoryEventKind, MemoryRecord, StoreResult, UpdateResult,
};
use parking_lot::Mutex;
use uuid::Uuid;

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StubCalls {
    pub store: usize,
    pub get_memories: usize,
    pub search_memories: usize,
    pub update_memory: usize,
    pub delete_memory: usize,
    pub delete_all_memories: usize,
    pub reset: usize,
}

impl StubCalls {
    pub fn total(&self) -> usize {
        self.store
            + self.get_memories
            + self.search_memories
            + self.update_memory
            + self.delete_memory
            + self.delete_all_memories
            + self.reset
    }
}

#[derive(Default)]
struct StubState {
    records: Vec<MemoryRecord>,
    calls: StubCalls,
    last_store: Option<StoreOptions>,
    last_get: Option<GetMemoriesOptions>,
    last_search: Option<SearchMemoriesOptions>,
    last_delete_all: Option<DeleteAllOptions>,
    failure: Option<EngineError>,
}

/// In-memory engine that stores one record per message and records calls.
#[derive(Default)]
pub struct StubEngine {
    state: Mutex<StubState>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<MemoryRecord>) -> Self {
        let engine = Self::default();
        engine.state.lock().records = records;
        engine
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: EngineError) {
        self.state.lock().failure = Some(err);
    }

    pub fn calls(&self) -> StubCalls {
        self.state.lock().calls
    }

    pub fn records(&self) -> Vec<MemoryRecord> {
        self.state.lock().records.clone()
    }

    pub fn record(&self, memory_id: &str) -> Option<MemoryRecord> {
        self.state
            .lock()
            .records
            .iter()
            .find(|record| record.id == memory_id)
            .cloned()
    }

    pub fn last_store(&self) -> Option<StoreOptions> {
        self.state.lock().last_store.clone()
    }

    pub fn last_get(&self) -> Option<GetMemoriesOptions> {
        self.state.lock().last_get.clone()
    }

    pub fn last_search(&self) -> Option<SearchMemoriesOptions> {
        self.state.lock().last_search.clone()
    }

    pub fn last_delete_all(&self) -> Option<DeleteAllOptions> {
        self.state.lock().last_delete_all.clone()
    }
}

fn check_failure(state: &StubState) -> Result<(), EngineError> {
    match &state.failure {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

/// Lowercased word overlap between a query and a record.
fn overlap(query: &str, content: &str) -> usize {
    let content = content.to_lowercase();
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty() && content.contains(*word))
        .count()
}

#[async_trait]
impl MemoryEngine for StubEngine {
    async fn store(&self, options: StoreOptions) -> Result<StoreResult, EngineError> {
        let mut state = self.state.lock();
        state.calls.store += 1;
        state.last_store = Some(options.clone());
        check_failure(&state)?;

        let mut results = Vec::new();
        for message in &options.messages {
            let mut record = MemoryRecord::new(
                Uuid::new_v4().to_string(),
                message.content.clone(),
                options.scope.clone(),
            );
            record.metadata = Some(options.metadata.clone());
            results.push(MemoryEvent::new(
                record.id.clone(),
                record.content.clone(),
                MemoryEventKind::Add,
            ));
            state.records.push(record);
        }
        Ok(StoreResult {
            results,
            ..StoreResult::default()
        })
    }

    async fn get_memories(
        &self,
        options: GetMemoriesOptions,
    ) -> Result<Vec<MemoryRecord>, EngineError> {
        let mut state = self.state.lock();
        state.calls.get_memories += 1;
        state.last_get = Some(options.clone());
        check_failure(&state)?;

        Ok(state
            .records
            .iter()
            .filter(|record| options.scope.matches(&record.scope))
            .cloned()
            .collect())
    }

    async fn search_memories(
        &self,
        options: SearchMemoriesOptions,
    ) -> Result<Vec<MemoryRecord>, EngineError> {
        let mut state = self.state.lock();
        state.calls.search_memories += 1;
        state.last_search = Some(options.clone());
        check_failure(&state)?;

        let mut ranked: Vec<(usize, MemoryRecord)> = state
            .records
            .iter()
            .filter(|record| options.scope.matches(&record.scope))
            .map(|record| (overlap(&options.query, &record.content), record.clone()))
            .filter(|(score, _)| *score > 0)
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(ranked
            .into_iter()
            .take(options.limit as usize)
            .map(|(score, mut record)| {
                record.score = Some(score as f64);
                record
            })
            .collect())
    }

    async fn update_memory(
        &self,
        memory_id: &str,
        new_content: &str,
    ) -> Result<UpdateResult, EngineError> {
        let mut state = self.state.lock();
        state.calls.update_memory += 1;
        check_failure(&state)?;

        let record = state
            .records
            .iter_mut()
            .find(|record| record.id == memory_id)
            .ok_or_else(|| EngineError::NotFound(memory_id.to_string()))?;
        record.content = new_content.to_string();
        Ok(UpdateResult {
            id: memory_id.to_string(),
            memory: Some(new_content.to_string()),
            message: Some("Memory updated successfully!".to_string()),
        })
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<DeleteResult, EngineError> {
        let mut state = self.state.lock();
        state.calls.delete_memory += 1;
        check_failure(&state)?;

        let before = state.records.len();
        state.records.retain(|record| record.id != memory_id);
        if state.records.len() == before {
            return Err(EngineError::NotFound(memory_id.to_string()));
        }
        Ok(DeleteResult::new("Memory deleted successfully!"))
    }

    async fn delete_all_memories(
        &self,
        options: DeleteAllOptions,
    ) -> Result<DeleteResult, EngineError> {
        let mut state = self.state.lock();
        state.calls.delete_all_memories += 1;
        state.last_delete_all = Some(options.clone());
        check_failure(&state)?;

        state
            .records
            .retain(|record| !options.scope.matches(&record.scope));
        Ok(DeleteResult::new("Memories deleted successfully!"))
    }

    async fn reset(&self) -> Result<DeleteResult, EngineError> {
        let mut state = self.state.lock();
        state.calls.reset += 1;
        check_failure(&state)?;

        state.records.clear();
        Ok(DeleteResult::new("Memory store reset successfully"))
    }
}
