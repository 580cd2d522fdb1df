// handlers/protected/auth/whoami.rs - GET /api/auth handler

use axum::Extension;

use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/auth - the authenticated caller, without the password hash
pub async fn whoami_get(Extension(user): Extension<User>) -> ApiResult<User> {
    Ok(ApiResponse::success(user))
}
