use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus snapshot freshness and live session count.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.screenings.snapshot().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "screening-gateway",
        "backend_url": state.backend.base_url(),
        "evaluation_timeout_secs": state.config.evaluation_timeout.as_secs(),
        "snapshot_refreshed_at": snapshot.refreshed_at,
        "live_sessions": state.interviews.len().await
    }))
}
