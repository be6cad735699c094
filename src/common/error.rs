use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;

use crate::common::response::ApiError;
use crate::infrastructure::encoder::ffmpeg::MergeError;
use crate::infrastructure::http::fetcher::FetchError;

/// Every way a merge or download request can fail. Each variant maps to
/// exactly one status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("merged output is not ready at {}: {reason}", path.display())]
    NotReady { path: PathBuf, reason: String },

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("requested range not satisfiable for artifact of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(FetchError::Write { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Fetch(_) => StatusCode::BAD_REQUEST,
            AppError::Merge(_) | AppError::NotReady { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Io(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let AppError::RangeNotSatisfiable { size } = self {
            return Response::builder()
                .status(status)
                .header(header::CONTENT_RANGE, format!("bytes */{}", size))
                .header(header::CACHE_CONTROL, "no-store")
                .body(Body::empty())
                .unwrap_or_else(|_| status.into_response());
        }

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        ApiError::new(status, self.to_string()).into_response()
    }
}
