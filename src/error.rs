// HTTP API Error Types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::auth::{PasswordError, TokenError};
use crate::config::Environment;
use crate::database::DatabaseError;
use crate::validation::{FieldError, ValidationErrors};

/// HTTP API error with its status code and wire body
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    Validation(Vec<FieldError>),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
    RouteNotFound { method: String, path: String },

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    Internal { message: String, detail: Option<String> },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for the given environment.
    ///
    /// Authentication failures and unexpected errors use the
    /// `{success, message}` envelope; everything else carries `msg`
    /// (or `errors` for validation).
    pub fn to_json(&self, environment: Environment) -> Value {
        match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::Unauthorized(message) => json!({ "success": false, "message": message }),
            ApiError::RouteNotFound { method, path } => json!({
                "success": false,
                "message": format!("Not Found - {} {}", method, path),
            }),
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg) => json!({ "msg": msg }),
            ApiError::Internal { message, detail } => match environment {
                Environment::Production => json!({ "success": false, "message": "Something went wrong" }),
                Environment::Staging => json!({ "success": false, "message": message }),
                Environment::Development => {
                    let mut body = json!({ "success": false, "message": message });
                    if let Some(detail) = detail {
                        body["detail"] = json!(detail);
                    }
                    body
                }
            },
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            detail: None,
        }
    }

    /// Logs the full error server-side and keeps it as development detail.
    pub fn unexpected(context: &str, err: &dyn std::error::Error) -> Self {
        tracing::error!("{}: {}", context, err);
        ApiError::Internal {
            message: err.to_string(),
            detail: Some(format!("{}: {:?}", context, err)),
        }
    }
}

// Convert other error types to ApiError
impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err.0)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            DatabaseError::Conflict(what) => ApiError::bad_request(format!("Duplicate value: {}", what)),
            other => ApiError::unexpected("Database error", &other),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::unexpected("Token error", &err)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::unexpected("Password hashing error", &err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge("Request body too large".to_string()),
            _ => ApiError::bad_request(rejection.body_text()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(errors) => write!(f, "validation failed on {} field(s)", errors.len()),
            ApiError::RouteNotFound { method, path } => write!(f, "Not Found - {} {}", method, path),
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg) => f.write_str(msg),
            ApiError::Internal { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Unexpected failure carried on a 500 response so the router can render it
/// for the environment in its own state.
#[derive(Debug, Clone)]
pub struct InternalFailure {
    pub message: String,
    pub detail: Option<String>,
}

impl InternalFailure {
    pub fn render(self, environment: Environment) -> Response {
        let err = ApiError::Internal {
            message: self.message,
            detail: self.detail,
        };
        (err.status_code(), Json(err.to_json(environment))).into_response()
    }
}

// Automatic HTTP response conversion for Axum. 500s start out with the
// production body until re-rendered.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status_code(), Json(self.to_json(Environment::Production))).into_response();
        if let ApiError::Internal { message, detail } = self {
            response.extensions_mut().insert(InternalFailure { message, detail });
        }
        response
    }
}
