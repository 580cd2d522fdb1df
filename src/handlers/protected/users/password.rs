// handlers/protected/users/password.rs - PUT /api/users/:id/password handler

use axum::{
    extract::{Path, State},
    Extension,
};

use super::record::user_id;
use crate::api::JsonBody;
use crate::database::models::User;
use crate::middleware::{ApiResult, Message};
use crate::services::user_service;
use crate::state::AppState;

pub async fn put(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> ApiResult<Message> {
    user_service::change_password(&state, &caller, user_id(&id)?, &body).await?;
    Ok(Message::new("Password updated successfully"))
}
