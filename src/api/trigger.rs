//! Trigger endpoint: start one listen-and-respond cycle

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;

use super::ApiState;

/// Build trigger router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/start-alexa", post(start))
        .with_state(state)
}

/// Acceptance response
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub message: String,
}

/// Spawn a worker and acknowledge immediately
///
/// The worker's outcome is only ever audible; nothing about it reaches
/// the HTTP caller.
async fn start(State(state): State<Arc<ApiState>>) -> Json<TriggerResponse> {
    let _worker = state.pipeline.trigger();

    Json(TriggerResponse {
        message: format!("{} started", state.assistant_name),
    })
}
