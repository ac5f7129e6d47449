use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
///
/// Liveness plus whether the follow-up worker is still accepting jobs.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let dispatch = if state.dispatcher.is_running() {
        "running"
    } else {
        "stopped"
    };
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "dispatch": dispatch,
    }))
}
