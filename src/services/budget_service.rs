use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Budget, Project, User};
use crate::error::ApiError;
use crate::policy::{self, BudgetAction};
use crate::state::AppState;
use crate::validation;

const BUDGET_NOT_FOUND: &str = "Budget not found";

/// Parent project of a budget listing or creation. Unknown or malformed ids
/// resolve to `None` and are denied by the access check.
async fn parent(state: &AppState, project: &str) -> Result<Option<Project>, ApiError> {
    match Uuid::parse_str(project.trim()) {
        Ok(id) => Ok(state.store.find_project(id).await?),
        Err(_) => Ok(None),
    }
}

/// Budget plus its parent project, checked for `action`.
async fn load_for(state: &AppState, caller: &User, id: Uuid, action: BudgetAction) -> Result<(Budget, Project), ApiError> {
    let budget = state
        .store
        .find_budget(id)
        .await?
        .ok_or_else(|| ApiError::not_found(BUDGET_NOT_FOUND))?;
    let project = state.store.find_project(budget.project).await?;
    if project.is_none() {
        warn!("Budget {} points at missing project {}", budget.id, budget.project);
    }
    policy::budget_access(caller, project.as_ref(), action)?;
    // budget_access only passes with a project
    let project = project.ok_or_else(|| ApiError::forbidden("Not authorized to access this project"))?;
    Ok((budget, project))
}

pub async fn list(state: &AppState, caller: &User, project: Option<&str>) -> Result<(Vec<Budget>, Project), ApiError> {
    let Some(key) = project.filter(|p| !p.trim().is_empty()) else {
        return Err(ApiError::bad_request("Project ID is required"));
    };
    let project = parent(state, key).await?;
    policy::budget_access(caller, project.as_ref(), BudgetAction::Read)?;
    let project = project.ok_or_else(|| ApiError::forbidden("Not authorized to access this project"))?;

    let budgets = state.store.list_budgets(project.id).await?;
    Ok((budgets, project))
}

pub async fn get(state: &AppState, caller: &User, id: Uuid) -> Result<(Budget, Project), ApiError> {
    load_for(state, caller, id, BudgetAction::Read).await
}

pub async fn create(state: &AppState, caller: &User, body: &Value) -> Result<(Budget, Project), ApiError> {
    let draft = validation::budget::new_budget(body, &state.catalog)?;
    let project = state.store.find_project(draft.project).await?;
    policy::budget_access(caller, project.as_ref(), BudgetAction::Create)?;
    let project = project.ok_or_else(|| ApiError::forbidden("Not authorized to add budgets to this project"))?;

    let budget = draft.into_budget(caller.id, &state.catalog, Utc::now());
    validation::budget::check_budget(&budget)?;
    state.store.insert_budget(&budget).await?;

    info!("Budget {} ({}) added to project {} by {}", budget.id, budget.service, project.id, caller.id);
    Ok((budget, project))
}

/// The owning project and creator are fixed at creation.
pub async fn update(state: &AppState, caller: &User, id: Uuid, body: &Value) -> Result<(Budget, Project), ApiError> {
    let (mut budget, project) = load_for(state, caller, id, BudgetAction::Update).await?;
    validation::budget::budget_patch(body, &state.catalog)?.apply(&mut budget, &state.catalog, Utc::now());
    validation::budget::check_budget(&budget)?;

    state.store.update_budget(&budget).await?;
    Ok((budget, project))
}

pub async fn delete(state: &AppState, caller: &User, id: Uuid) -> Result<(), ApiError> {
    let (budget, project) = load_for(state, caller, id, BudgetAction::Delete).await?;
    if !state.store.delete_budget(budget.id).await? {
        return Err(ApiError::not_found(BUDGET_NOT_FOUND));
    }
    info!("Budget {} removed from project {} by {}", budget.id, project.id, caller.id);
    Ok(())
}
