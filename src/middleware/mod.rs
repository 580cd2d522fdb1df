pub mod auth;
pub mod errors;
pub mod response;

pub use auth::{require_auth, TOKEN_HEADER};
pub use errors::render_internal_errors;
pub use response::{ApiResponse, ApiResult, Message};
