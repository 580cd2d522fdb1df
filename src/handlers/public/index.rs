// handlers/public/index.rs - GET /api handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /api - endpoint directory
pub async fn index_get(State(state): State<AppState>) -> Json<Value> {
    let documentation = state.config.api.docs_url.as_deref().unwrap_or("No docs URL set");

    Json(json!({
        "message": "API is working!",
        "endpoints": {
            "auth": "/api/auth",
            "users": "/api/users",
            "projects": "/api/projects",
            "budgets": "/api/budgets",
        },
        "documentation": documentation,
    }))
}
