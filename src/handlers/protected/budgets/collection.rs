// handlers/protected/budgets/collection.rs - /api/budgets handlers

use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::api::format::{self, BudgetView};
use crate::api::JsonBody;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::budget_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BudgetsQuery {
    pub project: Option<String>,
}

/// GET /api/budgets?project=:id - line items of one project, for its members
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Query(query): Query<BudgetsQuery>,
) -> ApiResult<Vec<BudgetView>> {
    let (budgets, project) = budget_service::list(&state, &caller, query.project.as_deref()).await?;
    Ok(ApiResponse::success(format::budget_views(state.store.as_ref(), budgets, &project).await?))
}

/// POST /api/budgets - add a line item to a project the caller belongs to
pub async fn post(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    JsonBody(body): JsonBody,
) -> ApiResult<BudgetView> {
    let (budget, project) = budget_service::create(&state, &caller, &body).await?;
    Ok(ApiResponse::created(format::budget_view(state.store.as_ref(), budget, &project).await?))
}
