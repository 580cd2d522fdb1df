// handlers/protected/projects/record.rs - /api/projects/:id handlers
//
// `:id` is a project id, or a project name when it is not a UUID.

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::api::format::{self, ProjectView};
use crate::api::JsonBody;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::services::project_service;
use crate::state::AppState;

/// GET /api/projects/:id - manager or team member
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(key): Path<String>,
) -> ApiResult<ProjectView> {
    let project = project_service::get(&state, &caller, &key).await?;
    Ok(ApiResponse::success(format::project_view(state.store.as_ref(), project).await?))
}

/// PUT /api/projects/:id - project manager only
pub async fn put(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(key): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<ProjectView> {
    let project = project_service::update(&state, &caller, &key, &body).await?;
    Ok(ApiResponse::success(format::project_view(state.store.as_ref(), project).await?))
}

/// DELETE /api/projects/:id - project manager only; budgets go with it
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(key): Path<String>,
) -> ApiResult<Message> {
    project_service::delete(&state, &caller, &key).await?;
    Ok(Message::new("Project removed"))
}
