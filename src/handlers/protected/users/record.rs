// handlers/protected/users/record.rs - /api/users/:id handlers

use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::api::JsonBody;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::services::user_service;
use crate::state::AppState;

/// Malformed ids cannot name a stored user.
pub(super) fn user_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("User not found"))
}

/// GET /api/users/:id - admin or self
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let user = user_service::get(&state, &caller, user_id(&id)?).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:id - name and email; role for admins
pub async fn put(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<User> {
    let user = user_service::update(&state, &caller, user_id(&id)?, &body).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id - admin only, never self
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    user_service::delete(&state, &caller, user_id(&id)?).await?;
    Ok(Message::new("User removed"))
}
