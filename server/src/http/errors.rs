//! Pre-stream error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dirstream_core::ListingError;
use thiserror::Error;

/// Failures reported with a JSON body before any record is sent.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request path escapes the root.
    #[error("Forbidden")]
    Forbidden,

    /// The directory could not be opened.
    #[error("Failed to read directory")]
    ReadFailed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::ReadFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(e: ListingError) -> Self {
        if e.is_forbidden() {
            ApiError::Forbidden
        } else {
            ApiError::ReadFailed
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
