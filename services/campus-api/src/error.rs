//! Error types for the Campus API service.
//!
//! Every core-layer error is translated here into an HTTP status and the
//! `{success: false, message}` envelope that all endpoints share.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use campus_academic_core::AcademicError;
use campus_auth_core::AuthError;
use campus_db::DbError;
use campus_fees_core::FeeError;
use campus_types::ApiResponse;

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request outside what the extractors already reject
    #[allow(dead_code)] // Json/Path/Query rejections cover the 400s for now
    #[error("{0}")]
    BadRequest(String),

    /// Authenticated but not allowed to perform the operation
    #[error("{0}")]
    Forbidden(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Well-formed request with semantically invalid content
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Academic(#[from] AcademicError),

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Auth(e) => from_u16(e.status_code()),
            Self::Academic(e) => from_u16(e.status_code()),
            Self::Fee(e) => from_u16(e.status_code()),
            Self::Db(DbError::NotFound) => StatusCode::NOT_FOUND,
            Self::Db(DbError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION",
            Self::Auth(e) => e.error_code(),
            Self::Academic(e) => e.error_code(),
            Self::Fee(e) => e.error_code(),
            Self::Db(DbError::NotFound) => "NOT_FOUND",
            Self::Db(DbError::Conflict(_)) => "CONFLICT",
            Self::Db(_) => "DATABASE_ERROR",
        }
    }
}

fn from_u16(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Server-side failures are logged in full and surfaced generically
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, code, "Internal API error");
            "internal error".to_string()
        } else {
            tracing::debug!(error = %self, code, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
