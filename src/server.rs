// =============================================================================
// server.rs - THE FRONT DOOR
// =============================================================================
//
//   POST /fetch    { "urls": [...] }  →  { "code", "msg", "data": { "contents" } }
//   GET  /health   liveness
//   GET  /metrics  counters as JSON
//
// The handler's job is small: read the payload, decide the proxy for this
// batch, hand both to the coordinator, wrap whatever comes back. Responses
// are gzipped for clients that ask, and every request gets a trace span.
// =============================================================================

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::fetcher::redact_proxy;
use crate::metrics::MetricsSnapshot;
use crate::models::{BatchResponse, FetchRequest};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/fetch", post(fetch_batch))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fetch_batch(
    State(state): State<AppState>,
    payload: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        state.metrics.increment_rejected();
        warn!(error = %rejection.body_text(), "Rejected unreadable fetch payload");
        ApiError::from(rejection)
    })?;

    let urls = request.into_urls();

    // Read once here, then fixed for the whole batch.
    let proxy = state.config.current_proxy();

    info!(
        urls = urls.len(),
        proxy = %proxy.as_deref().map(redact_proxy).unwrap_or_else(|| "direct".to_string()),
        "Fetch batch received"
    );

    let contents = state.coordinator.run_batch(urls, proxy).await;

    Ok(Json(BatchResponse::success(contents)))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
