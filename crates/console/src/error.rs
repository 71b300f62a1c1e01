use std::path::PathBuf;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use tailer::TailError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The log file did not exist or was not readable: \n{}\n", .0.display())]
    LogUnavailable(PathBuf),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<TailError> for ApiError {
    fn from(err: TailError) -> Self {
        match err {
            TailError::LogUnavailable { path, .. } => ApiError::LogUnavailable(path),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // The viewer runs inside an iframe; a missing log is shown in
            // place of the page rather than as an HTTP failure.
            ApiError::LogUnavailable(_) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                format!("ERROR: {}", self),
            )
                .into_response(),
            ApiError::Internal(ref detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
                    .into_response()
            }
        }
    }
}
