// handlers/protected/users/collection.rs - /api/users handlers

use axum::{extract::State, Extension};

use crate::api::JsonBody;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::user_service;
use crate::state::AppState;

/// GET /api/users - every user (admin only)
pub async fn get(State(state): State<AppState>, Extension(caller): Extension<User>) -> ApiResult<Vec<User>> {
    let users = user_service::list(&state, &caller).await?;
    Ok(ApiResponse::success(users))
}

/// POST /api/users - register a user (admin only)
pub async fn post(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    JsonBody(body): JsonBody,
) -> ApiResult<User> {
    let user = user_service::create(&state, &caller, &body).await?;
    Ok(ApiResponse::success(user))
}
