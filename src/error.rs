//! Error codes and the JSON error body returned by the HTTP API.
//!
//! Services own their `thiserror` enums and implement [`ErrorCode`]; routes
//! pick the status and convert with [`ApiError::from_error`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Trait for errors that carry a stable wire code.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

/// `{"error": true, "code": "...", "message": "..."}` with an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    /// Only set for `MISSING_COLUMNS`.
    pub missing: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: bool,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<&'a [String]>,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), missing: None }
    }

    #[must_use]
    pub fn from_error(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self::new(status, err.error_code(), err.to_string())
    }

    #[must_use]
    pub fn with_missing(mut self, missing: Vec<String>) -> Self {
        self.missing = Some(missing);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: true,
            code: self.code,
            message: &self.message,
            missing: self.missing.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
