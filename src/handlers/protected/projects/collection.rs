// handlers/protected/projects/collection.rs - /api/projects handlers

use axum::{
    extract::{Query, State},
    Extension,
};

use crate::api::format::{self, Page, ProjectView};
use crate::api::JsonBody;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::project_service::{self, ListParams};
use crate::state::AppState;

/// GET /api/projects - the caller's projects, newest first, paginated.
///
/// Query: `page`, `limit`, `status`, `manager`, `search`.
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Query(params): Query<ListParams>,
) -> ApiResult<Page<ProjectView>> {
    let listing = project_service::list(&state, &caller, &params).await?;
    let views = format::project_views(state.store.as_ref(), listing.projects).await?;
    Ok(ApiResponse::success(Page::new(views, listing.total, listing.page, listing.limit)))
}

/// POST /api/projects - managers only; the caller becomes the project manager
pub async fn post(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    JsonBody(body): JsonBody,
) -> ApiResult<ProjectView> {
    let project = project_service::create(&state, &caller, &body).await?;
    Ok(ApiResponse::created(format::project_view(state.store.as_ref(), project).await?))
}
