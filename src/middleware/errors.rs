use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::InternalFailure;
use crate::state::AppState;

/// Re-render unexpected failures for the configured environment, so only
/// development responses carry the error detail.
pub async fn render_internal_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    match response.extensions().get::<InternalFailure>().cloned() {
        Some(failure) => failure.render(state.config.environment),
        None => response,
    }
}
