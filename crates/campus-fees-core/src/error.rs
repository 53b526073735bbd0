//! Fee errors

use thiserror::Error;
use uuid::Uuid;

/// Errors from fee assignment, collection, and reporting
#[derive(Error, Debug)]
pub enum FeeError {
    /// Payment amount is zero or negative
    #[error("invalid payment amount: {0}")]
    InvalidAmount(i64),

    /// Payment would push amount_paid past amount_due
    #[error("payment of {attempted_cents} exceeds outstanding balance of {outstanding_cents}")]
    Overpayment {
        attempted_cents: i64,
        outstanding_cents: i64,
    },

    /// Unknown student fee id
    #[error("student fee {0} not found")]
    StudentFeeNotFound(Uuid),

    /// Unknown student id
    #[error("student {0} not found")]
    StudentNotFound(Uuid),

    /// Unknown receipt number
    #[error("receipt {0} not found")]
    ReceiptNotFound(String),

    /// Unknown transaction id
    #[error("transaction {0} not found")]
    TransactionNotFound(Uuid),

    /// Malformed reporting period
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Database error
    #[error("database error: {0}")]
    Db(#[from] campus_db::DbError),
}

impl FeeError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAmount(_) | Self::Overpayment { .. } | Self::InvalidPeriod(_) => 422,
            Self::StudentFeeNotFound(_)
            | Self::StudentNotFound(_)
            | Self::ReceiptNotFound(_)
            | Self::TransactionNotFound(_) => 404,
            Self::Db(campus_db::DbError::NotFound) => 404,
            Self::Db(campus_db::DbError::Conflict(_)) => 409,
            Self::Db(_) => 500,
        }
    }

    /// Stable error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::StudentFeeNotFound(_) => "STUDENT_FEE_NOT_FOUND",
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::ReceiptNotFound(_) => "RECEIPT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvalidPeriod(_) => "INVALID_PERIOD",
            Self::Db(campus_db::DbError::NotFound) => "NOT_FOUND",
            Self::Db(campus_db::DbError::Conflict(_)) => "CONFLICT",
            Self::Db(_) => "DATABASE_ERROR",
        }
    }
}
