use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::database::models::{Project, User};
use crate::database::{DatabaseError, ProjectQuery};
use crate::error::ApiError;
use crate::policy;
use crate::state::AppState;
use crate::types::ProjectStatus;
use crate::validation::{self, FieldError, ValidationErrors};

const PROJECT_NOT_FOUND: &str = "Project not found";

/// Query string of the project listing. Values stay raw so bad input
/// becomes a field error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub manager: Option<String>,
    pub search: Option<String>,
}

/// One page of the caller's projects.
pub struct Listing {
    pub projects: Vec<Project>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0)
}

pub fn build_query(caller: &User, params: &ListParams, api: &ApiConfig) -> Result<(ProjectQuery, u64), ValidationErrors> {
    let mut errors = Vec::new();
    let page = positive(params.page.as_deref()).unwrap_or(1);
    let limit = positive(params.limit.as_deref())
        .unwrap_or(api.default_page_limit as u64)
        .min(api.max_page_limit as u64);

    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match raw.parse::<ProjectStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.push(FieldError::new("status", "Invalid status"));
                None
            }
        },
        None => None,
    };
    let manager = match params.manager.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("manager", "Invalid manager ID"));
                None
            }
        },
        None => None,
    };
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    let query = ProjectQuery {
        member: caller.id,
        status,
        manager,
        search: params.search.clone().filter(|s| !s.trim().is_empty()),
        offset: (page - 1).saturating_mul(limit).min(i64::MAX as u64),
        limit,
    };
    Ok((query, page))
}

fn map_conflict(err: DatabaseError) -> ApiError {
    match err {
        DatabaseError::Conflict(_) => ApiError::bad_request("Project name already exists"),
        other => other.into(),
    }
}

/// `key` is an id, or a project name when it does not parse as one.
pub async fn resolve(state: &AppState, key: &str) -> Result<Project, ApiError> {
    let found = match Uuid::parse_str(key) {
        Ok(id) => state.store.find_project(id).await?,
        Err(_) => state.store.find_project_by_name(key).await?,
    };
    found.ok_or_else(|| ApiError::not_found(PROJECT_NOT_FOUND))
}

pub async fn list(state: &AppState, caller: &User, params: &ListParams) -> Result<Listing, ApiError> {
    let (query, page) = build_query(caller, params, &state.config.api)?;
    let (projects, total) = state.store.list_projects(&query).await?;
    Ok(Listing {
        projects,
        total,
        page,
        limit: query.limit,
    })
}

pub async fn get(state: &AppState, caller: &User, key: &str) -> Result<Project, ApiError> {
    let project = resolve(state, key).await?;
    policy::project_read(caller, &project)?;
    Ok(project)
}

pub async fn create(state: &AppState, caller: &User, body: &Value) -> Result<Project, ApiError> {
    policy::project_create(caller)?;
    let now = Utc::now();
    let project = validation::project::new_project(body, now)?.into_project(caller.id, now);
    validation::project::check_project(&project)?;

    state.store.insert_project(&project).await.map_err(map_conflict)?;
    info!("Project {} ({}) created by {}", project.id, project.name, caller.id);
    Ok(project)
}

/// Generic update; budget, manager and team are never touched here.
pub async fn update(state: &AppState, caller: &User, key: &str, body: &Value) -> Result<Project, ApiError> {
    let mut project = resolve(state, key).await?;
    policy::project_update(caller, &project)?;

    let now = Utc::now();
    validation::project::project_patch(body, now)?.apply(&mut project, now);
    validation::project::check_project(&project)?;

    state.store.update_project(&project).await.map_err(map_conflict)?;
    Ok(project)
}

/// Removes the project, then its budgets.
pub async fn delete(state: &AppState, caller: &User, key: &str) -> Result<(), ApiError> {
    let project = resolve(state, key).await?;
    policy::project_delete(caller, &project)?;

    if !state.store.delete_project(project.id).await? {
        return Err(ApiError::not_found(PROJECT_NOT_FOUND));
    }
    let budgets = state.store.delete_project_budgets(project.id).await?;
    info!("Project {} removed by {} with {} budget(s)", project.id, caller.id, budgets);
    Ok(())
}
