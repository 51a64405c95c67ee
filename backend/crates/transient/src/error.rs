//! Transient Error Types
//!
//! This module provides transient-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Transient-specific result type alias
pub type TransientResult<T> = Result<T, TransientError>;

/// Transient-specific error variants
#[derive(Debug, Error)]
pub enum TransientError {
    /// Unknown locally and upstream
    #[error("Transient not found: {0}")]
    NotFound(String),

    /// Name does not look like an IAU designation (`[SN|AT]YYYY...`)
    #[error("Transient not found, malformed name: {0}")]
    MalformedName(String),

    /// Upstream kept answering with an exhausted rate limit
    #[error("Upstream rejected {name} {attempts} times")]
    UpstreamTimeout { name: String, attempts: u32 },

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    /// Transport failure talking to the upstream registry
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Query parameter outside the accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Search page rendering failed
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransientError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransientError::NotFound(_) | TransientError::MalformedName(_) => ErrorKind::NotFound,
            TransientError::UpstreamTimeout { .. } => ErrorKind::RequestTimeout,
            TransientError::UpstreamStatus { .. } | TransientError::Upstream(_) => {
                ErrorKind::BadGateway
            }
            TransientError::InvalidParameter(_) => ErrorKind::BadRequest,
            TransientError::Database(_)
            | TransientError::Template(_)
            | TransientError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let app_err = AppError::new(self.kind(), self.to_string());
        match self {
            TransientError::UpstreamTimeout { .. } => {
                app_err.with_action("Retry after the upstream rate limit resets")
            }
            _ => app_err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            TransientError::Database(e) => {
                tracing::error!(error = %e, "Transient database error");
            }
            TransientError::Upstream(e) => {
                tracing::error!(error = %e, "Upstream registry unreachable");
            }
            TransientError::UpstreamStatus { status, message } => {
                tracing::error!(status, message = %message, "Upstream registry error");
            }
            TransientError::Template(e) => {
                tracing::error!(error = %e, "Search page rendering failed");
            }
            TransientError::Internal(msg) => {
                tracing::error!(message = %msg, "Transient internal error");
            }
            TransientError::UpstreamTimeout { name, attempts } => {
                tracing::warn!(name = %name, attempts, "Upstream rate limit not lifted");
            }
            _ => {
                tracing::debug!(error = %self, "Transient error");
            }
        }
    }
}

impl From<TransientError> for AppError {
    fn from(err: TransientError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for TransientError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
