//! Error types for the HTTP surface

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::buffer::BufferError;
use crate::reconstruct::ReconstructError;

/// Handler result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid request method. Only {0} is allowed.")]
    MethodNotAllowed(&'static str),

    #[error("{0}")]
    Internal(String),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Reconstruction failed: {0}")]
    Reconstruct(#[from] ReconstructError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Buffer(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Reconstruct(ReconstructError::ZeroChunkSize) => StatusCode::BAD_REQUEST,
            AppError::Reconstruct(_) | AppError::Internal(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Rejected request: {}", self);
        }

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self),
        )
            .into_response();
        if let AppError::MethodNotAllowed(method) = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(method));
        }
        response
    }
}
