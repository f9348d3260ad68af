//! HTTP surface for memgate.
//!
//! Routes are thin: each decodes its input, delegates to
//! [`MemoryHandlers`](memgate_core::MemoryHandlers) and serializes the
//! result unchanged.

mod error;
mod extract;
mod routes;

pub use error::ServerError;
pub use extract::{ApiJson, ApiQuery};

use axum::error_handling::HandleErrorLayer;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{BoxError, Router};
use log::{info, warn};
use memgate_config::ServerConfig;
use memgate_core::MemoryHandlers;
use memgate_engine::MemoryEngine;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub handlers: MemoryHandlers,
}

impl AppState {
    pub fn new(engine: Arc<dyn MemoryEngine>) -> Self {
        Self {
            handlers: MemoryHandlers::new(engine),
        }
    }
}

/// Build the router for the given state and listener settings.
///
/// `POST /memories/reset` only reaches the engine when `allow_reset` is set.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(routes::health))
        .route("/memories/store", post(routes::store_memory))
        .route("/memories/search", post(routes::search_memories))
        .route("/memories/update", post(routes::update_memory))
        .route(
            "/memories",
            get(routes::get_memories).delete(routes::delete_all_memories),
        )
        .route(
            "/memories/{memory_id}",
            put(routes::update_memory_content).delete(routes::delete_memory),
        );
    // A static segment wins over `{memory_id}`, so a disabled reset still
    // answers 404 instead of 405.
    let router = if config.allow_reset {
        router.route("/memories/reset", post(routes::reset_memories))
    } else {
        info!("reset route disabled");
        router.route("/memories/reset", post(routes::fallback))
    };

    let timeout = Duration::from_secs(config.request_timeout_secs);
    router
        .fallback(routes::fallback)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(HandleErrorLayer::new(move |err: BoxError| async move {
                    layer_failure(err, timeout)
                }))
                .layer(TimeoutLayer::new(timeout)),
        )
}

/// Render failures from the middleware stack; the route future is already
/// dropped by the time this runs.
fn layer_failure(err: BoxError, timeout: Duration) -> Response {
    if err.is::<Elapsed>() {
        warn!("request timed out (timeout_secs={})", timeout.as_secs());
        return error::error_response(
            StatusCode::REQUEST_TIMEOUT,
            format!("request timed out after {}s", timeout.as_secs()),
        );
    }
    warn!("request failed in middleware (error={})", err);
    error::error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        "request handled (method={}, path={}, status={}, elapsed_ms={})",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
