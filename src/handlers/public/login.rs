// handlers/public/login.rs - POST /api/auth handler

use axum::extract::State;
use serde::Serialize;

use crate::api::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/auth - exchange `{email, password}` for a token
pub async fn login_post(State(state): State<AppState>, JsonBody(body): JsonBody) -> ApiResult<TokenResponse> {
    let token = auth_service::login(&state, &body).await?;
    Ok(ApiResponse::success(TokenResponse { token }))
}
