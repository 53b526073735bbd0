//! Academic errors

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Errors from session management operations
#[derive(Error, Debug)]
pub enum AcademicError {
    /// Name is empty after trimming
    #[error("name must not be empty")]
    EmptyName,

    /// Start date falls after end date
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// Unknown session id
    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// Database error
    #[error("database error: {0}")]
    Db(#[from] campus_db::DbError),
}

impl AcademicError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyName | Self::InvalidDateRange { .. } => 422,
            Self::SessionNotFound(_) => 404,
            Self::Db(campus_db::DbError::NotFound) => 404,
            Self::Db(campus_db::DbError::Conflict(_)) => 409,
            Self::Db(_) => 500,
        }
    }

    /// Stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "EMPTY_NAME",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::SessionNotFound(_) => "SESSION_NOT_FOUND",
            Self::Db(campus_db::DbError::NotFound) => "NOT_FOUND",
            Self::Db(campus_db::DbError::Conflict(_)) => "CONFLICT",
            Self::Db(_) => "DATABASE_ERROR",
        }
    }
}
