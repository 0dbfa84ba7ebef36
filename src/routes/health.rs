use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    sessions: usize,
    version: String,
}

/// Health check endpoint
///
/// Reports liveness and the number of sessions currently held in memory
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.sessions.len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
