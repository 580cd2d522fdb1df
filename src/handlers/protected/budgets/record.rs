// handlers/protected/budgets/record.rs - /api/budgets/:id handlers

use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::api::format::{self, BudgetView};
use crate::api::JsonBody;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Message};
use crate::services::budget_service;
use crate::state::AppState;

fn budget_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Budget not found"))
}

/// GET /api/budgets/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<BudgetView> {
    let (budget, project) = budget_service::get(&state, &caller, budget_id(&id)?).await?;
    Ok(ApiResponse::success(format::budget_view(state.store.as_ref(), budget, &project).await?))
}

/// PUT /api/budgets/:id - team members and the manager
pub async fn put(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<BudgetView> {
    let (budget, project) = budget_service::update(&state, &caller, budget_id(&id)?, &body).await?;
    Ok(ApiResponse::success(format::budget_view(state.store.as_ref(), budget, &project).await?))
}

/// DELETE /api/budgets/:id - project manager only
pub async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    budget_service::delete(&state, &caller, budget_id(&id)?).await?;
    Ok(Message::new("Budget removed"))
}
