// handlers/public/health.rs - GET /api/health handler

use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// GET /api/health - liveness probe. Always 200; store reachability is reported
/// in the body rather than the status.
pub async fn health_get(State(state): State<AppState>) -> Json<Value> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!("Health check: store unreachable: {}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "database": database,
    }))
}
