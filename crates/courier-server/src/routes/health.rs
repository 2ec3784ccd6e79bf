//! Liveness endpoint for the bridge.

use axum::{Json, Router, extract::State, routing::get};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Body of `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Live sessions attached to this process.
    pub sessions: usize,
    /// Sessions that have received at least one notification.
    pub cursors: usize,
    /// `pubsub/topic` carrying input and updates.
    pub topic: String,
}

/// GET /health
///
/// Answers without touching the sidecar, so it stays up while Dapr is
/// restarting.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.len(),
        cursors: state.updates.cursors().len(),
        topic: state.config().topic.to_string(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
