// =============================================================================
// error.rs - THE ONLY ERROR A CALLER EVER SEES
// =============================================================================
//
// Per-URL failures never get this far; the coordinator swallows them. The
// one thing that does fail a request is a payload we can't read, and that
// comes back as a 400 wearing the usual response envelope.
// =============================================================================

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::models::BatchResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The payload wasn't JSON, wasn't sent as JSON, or had the wrong shape.
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = BatchResponse::failure(i32::from(status.as_u16()), self.to_string());
        (status, Json(body)).into_response()
    }
}
