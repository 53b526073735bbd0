//! Database row models
//!
//! Plain `FromRow` structs mirroring table columns. Enumerations are stored
//! as lowercase text and parsed at the service edges.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User account row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bearer token row; the token itself is never stored, only its digest
#[derive(Debug, Clone, FromRow)]
pub struct AuthTokenRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl AuthTokenRow {
    /// Check if the token row is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if the token row is usable (not expired and not revoked)
    pub fn is_valid(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}

/// Academic session row
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRow {
    /// Whether this is the active session
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

/// Counts of records that belong to one session
#[derive(Debug, Clone, Copy, FromRow)]
pub struct SessionDependents {
    pub students: i64,
    pub classes: i64,
    pub sections: i64,
}

/// Class row
#[derive(Debug, Clone, FromRow)]
pub struct ClassRow {
    pub id: Uuid,
    pub name: String,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Section row, always attached to one class
#[derive(Debug, Clone, FromRow)]
pub struct SectionRow {
    pub id: Uuid,
    pub name: String,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Student admission row
#[derive(Debug, Clone, FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub admission_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub class_id: Uuid,
    pub section_id: Option<Uuid>,
    pub session_id: Uuid,
    pub admission_date: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fee group row
#[derive(Debug, Clone, FromRow)]
pub struct FeeGroupRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fee type row
#[derive(Debug, Clone, FromRow)]
pub struct FeeTypeRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub fee_group_id: Uuid,
    pub session_id: Uuid,
    pub frequency: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Class-level fee template row
#[derive(Debug, Clone, FromRow)]
pub struct FeeMasterRow {
    pub id: Uuid,
    pub fee_group_id: Uuid,
    pub fee_type_id: Uuid,
    pub class_id: Uuid,
    pub session_id: Uuid,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

/// Fee template joined with its fee type, as needed by the assignment fan-out
#[derive(Debug, Clone, FromRow)]
pub struct FeeMasterDetailRow {
    pub id: Uuid,
    pub fee_group_id: Uuid,
    pub fee_type_id: Uuid,
    pub fee_type_name: String,
    pub class_id: Uuid,
    pub session_id: Uuid,
    pub amount_cents: i64,
    pub due_date: Option<NaiveDate>,
}

/// Per-student fee obligation row.
///
/// Carries no status column: status is derived from the amounts and the due
/// date wherever it is presented.
#[derive(Debug, Clone, FromRow)]
pub struct StudentFeeRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub fee_type_id: Uuid,
    pub session_id: Uuid,
    pub amount_due_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentFeeRow {
    /// Balance still owed on this fee
    pub fn outstanding_cents(&self) -> i64 {
        self.amount_due_cents - self.amount_paid_cents
    }
}

/// Student fee joined with its fee type and group names, for summaries
#[derive(Debug, Clone, FromRow)]
pub struct StudentFeeDetailRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub fee_type_id: Uuid,
    pub fee_type_name: String,
    pub fee_group_name: String,
    pub session_id: Uuid,
    pub amount_due_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: Option<NaiveDate>,
}

impl StudentFeeDetailRow {
    /// Balance still owed on this fee
    pub fn outstanding_cents(&self) -> i64 {
        self.amount_due_cents - self.amount_paid_cents
    }
}

/// Immutable payment record row
#[derive(Debug, Clone, FromRow)]
pub struct FeeTransactionRow {
    pub id: Uuid,
    pub receipt_no: String,
    pub student_id: Uuid,
    pub fee_type_id: Uuid,
    pub session_id: Uuid,
    pub amount_cents: i64,
    pub payment_mode: String,
    pub reference_no: Option<String>,
    pub collected_by: Uuid,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Aggregate over a set of fee transactions
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CollectionTotals {
    pub total_cents: i64,
    pub count: i64,
}

/// Per-payment-mode aggregate
#[derive(Debug, Clone, FromRow)]
pub struct ModeTotalsRow {
    pub payment_mode: String,
    pub total_cents: i64,
    pub count: i64,
}

/// Per-day aggregate
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DayTotalsRow {
    pub day: NaiveDate,
    pub total_cents: i64,
    pub count: i64,
}
