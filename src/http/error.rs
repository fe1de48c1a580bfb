//! API error type with IntoResponse
//!
//! Every data-access failure surfaces as HTTP 500 with the error's display
//! message as a plain-text body. The cause is logged before responding;
//! the request fails, the process keeps serving.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::db::DbError;

/// API error type with automatic HTTP status mapping
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Db(#[from] DbError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Db(e) => tracing::error!("database error: {e}"),
        }
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
