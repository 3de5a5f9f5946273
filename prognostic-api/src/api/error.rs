//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Request-boundary error taxonomy
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid request field (400)
    Validation(String),
    /// No row for the given email (404)
    NotFound(String),
    /// Store-level failure; message passed through verbatim (400)
    Persistence(String),
}

impl From<prognostic_common::Error> for ApiError {
    fn from(err: prognostic_common::Error) -> Self {
        match err {
            prognostic_common::Error::InvalidInput(msg) => ApiError::Validation(msg),
            prognostic_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            prognostic_common::Error::Database(e) => ApiError::Persistence(e.to_string()),
            other => ApiError::Persistence(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) | ApiError::Persistence(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": msg })),
            )
                .into_response(),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": msg })),
            )
                .into_response(),
        }
    }
}
