use serde_json::Value;
use tracing::{info, warn};

use crate::auth::{fingerprint, verify_password};
use crate::database::models::User;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const NO_TOKEN: &str = "No token, authorization denied";
pub const TOKEN_INVALID: &str = "Token is not valid";
pub const USER_GONE: &str = "The user belonging to this token no longer exists";
pub const PASSWORD_CHANGED: &str = "User recently changed password. Please log in again";

/// Exchange email and password for a signed token.
pub async fn login(state: &AppState, body: &Value) -> Result<String, ApiError> {
    let request = validation::user::login(body)?;

    let Some(user) = state.store.find_user_by_email(&request.email).await? else {
        warn!("Login rejected: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };
    if !verify_password(&request.password, &user.password).await? {
        warn!("Login rejected: bad password for user {}", user.id);
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(user.id)?;
    info!("User {} logged in", user.id);
    Ok(token)
}

/// Resolve the caller behind a token, rejecting stale ones.
pub async fn authenticate(state: &AppState, token: &str) -> Result<User, ApiError> {
    let claims = state.tokens.verify(token).map_err(|err| {
        warn!("Token {} rejected: {}", fingerprint(token), err);
        ApiError::unauthorized(TOKEN_INVALID)
    })?;

    let Some(user) = state.store.find_user(claims.sub).await? else {
        warn!("Token {} names missing user {}", fingerprint(token), claims.sub);
        return Err(ApiError::unauthorized(USER_GONE));
    };

    if user.changed_password_after(claims.iat) {
        warn!("Token {} predates password change of {}", fingerprint(token), user.id);
        return Err(ApiError::unauthorized(PASSWORD_CHANGED));
    }

    Ok(user)
}
