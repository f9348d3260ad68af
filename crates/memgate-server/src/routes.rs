use crate::AppState;
use crate::error::{ServerError, error_response};
use crate::extract::{ApiJson, ApiQuery};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use memgate_protocol::{
    DeleteResult, MemoryRecord, MemoryScope, SearchMemoriesRequest,
    StoreMemoryRequest, StoreResult, UpdateContentRequest, UpdateMemoryRequest, UpdateResult,
};

type RouteResult<T> = Result<Json<T>, ServerError>;

pub(crate) async fn health() -> &'static str {
    "OK"
}

pub(crate) async fn store_memory(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StoreMemoryRequest>,
) -> RouteResult<StoreResult> {
    Ok(Json(state.handlers.store(request).await?))
}

pub(crate) async fn get_memories(
    State(state): State<AppState>,
    ApiQuery(scope): ApiQuery<MemoryScope>,
) -> RouteResult<Vec<MemoryRecord>> {
    Ok(Json(state.handlers.get_memories(scope).await?))
}

pub(crate) async fn search_memories(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SearchMemoriesRequest>,
) -> RouteResult<Vec<MemoryRecord>> {
    Ok(Json(state.handlers.search(request).await?))
}

pub(crate) async fn update_memory(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdateMemoryRequest>,
) -> RouteResult<UpdateResult> {
    let result = state
        .handlers
        .update(&request.memory_id, &request.data)
        .await?;
    Ok(Json(result))
}

pub(crate) async fn update_memory_content(
    State(state): State<AppState>,
    Path(memory_id): Path<String>,
    ApiJson(request): ApiJson<UpdateContentRequest>,
) -> RouteResult<UpdateResult> {
    Ok(Json(state.handlers.update(&memory_id, &request.data).await?))
}

pub(crate) async fn delete_memory(
    State(state): State<AppState>,
    Path(memory_id): Path<String>,
) -> RouteResult<DeleteResult> {
    Ok(Json(state.handlers.delete(&memory_id).await?))
}

pub(crate) async fn delete_all_memories(
    State(state): State<AppState>,
    ApiQuery(scope): ApiQuery<MemoryScope>,
) -> RouteResult<DeleteResult> {
    Ok(Json(state.handlers.delete_all(scope).await?))
}

pub(crate) async fn reset_memories(State(state): State<AppState>) -> RouteResult<DeleteResult> {
    Ok(Json(state.handlers.reset().await?))
}

pub(crate) async fn fallback(method: Method, uri: Uri) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("no route for {} {}", method, uri.path()),
    )
}

pub(crate) async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        format!("method {} not allowed on {}", method, uri.path()),
    )
}
