use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::services::auth_service::{self, NO_TOKEN};
use crate::state::AppState;

/// Header carrying the identity token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Access guard for protected routes. Resolves the caller and stores the
/// `User` in request extensions for `Extension<User>` extraction.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).ok_or_else(|| ApiError::unauthorized(NO_TOKEN))?;
    let user = auth_service::authenticate(&state, token).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Token from `x-auth-token`, falling back to an `Authorization: Bearer` header.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get(TOKEN_HEADER) {
        return value.to_str().ok().map(str::trim).filter(|t| !t.is_empty());
    }
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
