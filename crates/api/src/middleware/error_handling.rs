//! # Error Handling Middleware
//!
//! Maps [`CounselError`] to HTTP status codes and the JSON error body every
//! endpoint shares: `{"success": false, "error": "<message>"}`.
//!
//! Extractor rejections (malformed JSON, bad path or query parameters) are
//! folded into [`CounselError::InvalidPayload`] so clients see the same shape.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use counselsync_core::errors::CounselError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use counselsync_api::middleware::error_handling::AppError;
/// use counselsync_core::errors::CounselError;
///
/// async fn handler(time: String) -> Result<Json<String>, AppError> {
///     if time.is_empty() {
///         return Err(AppError(CounselError::InvalidPayload("time is required".into())));
///     }
///     Ok(Json(time))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub CounselError);

/// Status code an error is reported with.
pub fn status_for(err: &CounselError) -> StatusCode {
    match err {
        CounselError::SlotNotFound(_) | CounselError::NotFound(_) => StatusCode::NOT_FOUND,
        CounselError::SlotAlreadyBooked(_) | CounselError::DuplicateRating(_) => {
            StatusCode::CONFLICT
        }
        CounselError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        CounselError::Authorization(_) => StatusCode::FORBIDDEN,
        CounselError::TransactionConflict(_) => StatusCode::SERVICE_UNAVAILABLE,
        CounselError::Network(_) => StatusCode::BAD_GATEWAY,
        CounselError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = Json(json!({ "success": false, "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<CounselError> for AppError {
    fn from(err: CounselError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(CounselError::Database(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(CounselError::InvalidPayload(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(CounselError::InvalidPayload(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError(CounselError::InvalidPayload(rejection.body_text()))
    }
}

/// Maps a CounselError straight to an HTTP response
pub fn map_error(err: CounselError) -> Response {
    AppError(err).into_response()
}
