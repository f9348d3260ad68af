//! Validation and normalization of request fields into engine options.
//!
//! Every function here is a pure transform. Validation failures surface as
//! `ApiError::Validation` before any engine call is attempted.

use crate::error::ApiError;
use memgate_engine::{
    DEFAULT_SEARCH_LIMIT, DeleteAllOptions, GetMemoriesOptions, SearchMemoriesOptions,
    StoreOptions,
};
use memgate_protocol::{MemoryScope, SearchMemoriesRequest, StoreMemoryRequest};

/// Build store options; at least one complete message is required.
pub fn build_store_options(request: StoreMemoryRequest) -> Result<StoreOptions, ApiError> {
    if request.messages.is_empty() {
        return Err(ApiError::validation("messages must not be empty"));
    }
    for (index, message) in request.messages.iter().enumerate() {
        if message.role.trim().is_empty() {
            return Err(ApiError::validation(format!(
                "messages[{index}].role must not be empty"
            )));
        }
        if message.content.trim().is_empty() {
            return Err(ApiError::validation(format!(
                "messages[{index}].content must not be empty"
            )));
        }
    }
    Ok(StoreOptions {
        messages: request.messages,
        scope: normalize_scope(request.scope),
        metadata: request.metadata.unwrap_or_default(),
    })
}

/// Build list options. No identifier is required.
pub fn build_get_options(scope: MemoryScope) -> GetMemoriesOptions {
    GetMemoriesOptions {
        scope: normalize_scope(scope),
    }
}

/// Build search options; the query is required and `limit` defaults to 10.
pub fn build_search_options(
    request: SearchMemoriesRequest,
) -> Result<SearchMemoriesOptions, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::validation("query must not be empty"));
    }
    let limit = match request.limit {
        None => DEFAULT_SEARCH_LIMIT,
        Some(limit) if limit <= 0 => {
            return Err(ApiError::validation(format!(
                "limit must be a positive integer, got {limit}"
            )));
        }
        Some(limit) => u32::try_from(limit).map_err(|_| {
            ApiError::validation(format!("limit must be at most {}, got {limit}", u32::MAX))
        })?,
    };
    Ok(SearchMemoriesOptions {
        query: request.query,
        scope: normalize_scope(request.scope),
        limit,
    })
}

/// Validate the id and replacement content of an update.
pub fn build_update<'a>(memory_id: &'a str, data: &'a str) -> Result<(&'a str, &'a str), ApiError> {
    let memory_id = require_memory_id(memory_id)?;
    if data.trim().is_empty() {
        return Err(ApiError::validation("data must not be empty"));
    }
    Ok((memory_id, data))
}

/// Validate the id of a single delete.
pub fn build_delete(memory_id: &str) -> Result<&str, ApiError> {
    require_memory_id(memory_id)
}

/// Build bulk delete options; an unscoped wipe is refused.
pub fn build_delete_all_options(scope: MemoryScope) -> Result<DeleteAllOptions, ApiError> {
    let scope = normalize_scope(scope);
    if scope.is_empty() {
        return Err(ApiError::validation(
            "deleting all memories requires at least one of user_id, agent_id, app_id, run_id",
        ));
    }
    Ok(DeleteAllOptions { scope })
}

fn require_memory_id(memory_id: &str) -> Result<&str, ApiError> {
    let memory_id = memory_id.trim();
    if memory_id.is_empty() {
        return Err(ApiError::validation("memory_id must not be empty"));
    }
    Ok(memory_id)
}

/// Blank identifiers carry no filter; other values pass through untouched.
fn normalize_scope(scope: MemoryScope) -> MemoryScope {
    fn present(value: Option<String>) -> Option<String> {
        value.filter(|value| !value.trim().is_empty())
    }
    MemoryScope {
        user_id: present(scope.user_id),
        agent_id: present(scope.agent_id),
        app_id: present(scope.app_id),
        run_id: present(scope.run_id),
    }
}
