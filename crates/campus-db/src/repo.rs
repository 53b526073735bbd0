//! Repository traits
//!
//! Async repository interfaces for database operations. Multi-statement
//! writes (session activation sweeps, fee fan-out, payment recording) are
//! single trait methods so each implementation owns its transaction scope.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// List all users
    async fn list(&self) -> DbResult<Vec<UserRow>>;

    /// Create a new user
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Apply a partial update; NotFound if the id does not exist
    async fn update(&self, id: Uuid, update: UpdateUser) -> DbResult<UserRow>;

    /// Delete a user
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub active: bool,
}

/// Partial user update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
}

/// Bearer token repository trait
#[async_trait]
pub trait AuthTokenRepository: Send + Sync {
    /// Store a new token digest
    async fn create(&self, token: CreateAuthToken) -> DbResult<AuthTokenRow>;

    /// Find a live token row by digest (not revoked, not expired)
    async fn find_valid_by_hash(&self, token_hash: &str) -> DbResult<Option<AuthTokenRow>>;

    /// Revoke a token by ID; returns whether a row was revoked
    async fn revoke(&self, id: Uuid) -> DbResult<bool>;

    /// Revoke all tokens for a user; returns the number revoked
    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64>;
}

/// Create token input
#[derive(Debug, Clone)]
pub struct CreateAuthToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Academic session repository trait.
///
/// `create`, `update`, and `switch_active` each run inside one transaction;
/// whenever a session becomes active, every other session is deactivated in
/// the same transaction, so the at-most-one-active invariant holds at every
/// commit point.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a session by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>>;

    /// Find the currently active session, if any
    async fn find_active(&self) -> DbResult<Option<SessionRow>>;

    /// List all sessions, newest start date first
    async fn list(&self) -> DbResult<Vec<SessionRow>>;

    /// Insert a session, sweeping other sessions inactive when this one is active
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow>;

    /// Apply a partial update with the same activation sweep, excluding `id`
    async fn update(&self, id: Uuid, update: UpdateSession) -> DbResult<SessionRow>;

    /// Deactivate every session and activate `id`; NotFound rolls back the sweep
    async fn switch_active(&self, id: Uuid) -> DbResult<SessionRow>;

    /// Delete a session
    async fn delete(&self, id: Uuid) -> DbResult<()>;

    /// Count students, classes, and sections belonging to a session
    async fn dependent_counts(&self, id: Uuid) -> DbResult<SessionDependents>;
}

/// Create session input
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

/// Partial session update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateSession {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Class repository trait
#[async_trait]
pub trait ClassRepository: Send + Sync {
    /// Find a class by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClassRow>>;

    /// List classes, optionally scoped to one session
    async fn list(&self, session_id: Option<Uuid>) -> DbResult<Vec<ClassRow>>;

    /// Create a new class
    async fn create(&self, class: CreateClass) -> DbResult<ClassRow>;

    /// Rename a class; NotFound if the id does not exist
    async fn rename(&self, id: Uuid, name: &str) -> DbResult<ClassRow>;

    /// Delete a class
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create class input
#[derive(Debug, Clone)]
pub struct CreateClass {
    pub id: Uuid,
    pub name: String,
    pub session_id: Uuid,
}

/// Section repository trait
#[async_trait]
pub trait SectionRepository: Send + Sync {
    /// Find a section by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SectionRow>>;

    /// List sections of a class
    async fn list_by_class(&self, class_id: Uuid) -> DbResult<Vec<SectionRow>>;

    /// Create a new section
    async fn create(&self, section: CreateSection) -> DbResult<SectionRow>;

    /// Delete a section
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create section input
#[derive(Debug, Clone)]
pub struct CreateSection {
    pub id: Uuid,
    pub name: String,
    pub class_id: Uuid,
}

/// Student repository trait
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find a student by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<StudentRow>>;

    /// List students matching the filter, newest admission first
    async fn list(&self, filter: StudentFilter) -> DbResult<Vec<StudentRow>>;

    /// List active students of a class within a session
    async fn list_by_class_session(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<StudentRow>>;

    /// Create a new student admission record
    async fn create(&self, student: CreateStudent) -> DbResult<StudentRow>;

    /// Apply a partial update; NotFound if the id does not exist
    async fn update(&self, id: Uuid, update: UpdateStudent) -> DbResult<StudentRow>;

    /// Delete a student
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Optional student list filters
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentFilter {
    pub class_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
}

/// Create student input
#[derive(Debug, Clone)]
pub struct CreateStudent {
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
}

/// Partial student update; `None` fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateStudent {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub class_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub active: Option<bool>,
}

/// Fee group repository trait
#[async_trait]
pub trait FeeGroupRepository: Send + Sync {
    /// Find a fee group by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeGroupRow>>;

    /// List fee groups, optionally scoped to one session
    async fn list(&self, session_id: Option<Uuid>) -> DbResult<Vec<FeeGroupRow>>;

    /// Create a new fee group
    async fn create(&self, group: CreateFeeGroup) -> DbResult<FeeGroupRow>;

    /// Apply a partial update; NotFound if the id does not exist
    async fn update(&self, id: Uuid, update: UpdateFeeGroup) -> DbResult<FeeGroupRow>;

    /// Delete a fee group
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create fee group input
#[derive(Debug, Clone)]
pub struct CreateFeeGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub session_id: Uuid,
}

/// Partial fee group update
#[derive(Debug, Clone, Default)]
pub struct UpdateFeeGroup {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Fee type repository trait
#[async_trait]
pub trait FeeTypeRepository: Send + Sync {
    /// Find a fee type by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeTypeRow>>;

    /// List fee types, optionally scoped to a session and/or group
    async fn list(
        &self,
        session_id: Option<Uuid>,
        fee_group_id: Option<Uuid>,
    ) -> DbResult<Vec<FeeTypeRow>>;

    /// Create a new fee type
    async fn create(&self, fee_type: CreateFeeType) -> DbResult<FeeTypeRow>;

    /// Apply a partial update; NotFound if the id does not exist
    async fn update(&self, id: Uuid, update: UpdateFeeType) -> DbResult<FeeTypeRow>;

    /// Delete a fee type
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create fee type input
#[derive(Debug, Clone)]
pub struct CreateFeeType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub fee_group_id: Uuid,
    pub session_id: Uuid,
    pub frequency: String,
    pub due_date: Option<NaiveDate>,
}

/// Partial fee type update
#[derive(Debug, Clone, Default)]
pub struct UpdateFeeType {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub frequency: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Fee master (class-level template) repository trait
#[async_trait]
pub trait FeeMasterRepository: Send + Sync {
    /// Find a fee template by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeMasterRow>>;

    /// List fee templates, optionally scoped to a session and/or class
    async fn list(
        &self,
        session_id: Option<Uuid>,
        class_id: Option<Uuid>,
    ) -> DbResult<Vec<FeeMasterRow>>;

    /// List templates for one class/session joined with their fee types
    async fn list_for_class(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<FeeMasterDetailRow>>;

    /// Create a new fee template
    async fn create(&self, master: CreateFeeMaster) -> DbResult<FeeMasterRow>;

    /// Change the template amount; NotFound if the id does not exist
    async fn update_amount(&self, id: Uuid, amount_cents: i64) -> DbResult<FeeMasterRow>;

    /// Delete a fee template
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}

/// Create fee master input
#[derive(Debug, Clone)]
pub struct CreateFeeMaster {
    pub id: Uuid,
    pub fee_group_id: Uuid,
    pub fee_type_id: Uuid,
    pub class_id: Uuid,
    pub session_id: Uuid,
    pub amount_cents: i64,
}

/// Student fee repository trait
#[async_trait]
pub trait StudentFeeRepository: Send + Sync {
    /// Find a student fee by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<StudentFeeRow>>;

    /// List student fees matching the filter, joined with fee type names
    async fn list(&self, filter: StudentFeeFilter) -> DbResult<Vec<StudentFeeDetailRow>>;

    /// List one student's fees within a session, joined with fee type names
    async fn list_for_student(
        &self,
        student_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<StudentFeeDetailRow>>;

    /// Insert-or-update the given obligations in one transaction.
    ///
    /// Conflicting rows (same student, fee type, and session) have only their
    /// amount_due and due_date refreshed; amount_paid is never touched, so
    /// re-assignment cannot erase recorded payments. Returns the number of
    /// rows written.
    async fn upsert_assignments(&self, assignments: Vec<CreateStudentFee>) -> DbResult<u64>;
}

/// Optional student fee list filters
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentFeeFilter {
    pub student_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
}

/// Create student fee input
#[derive(Debug, Clone)]
pub struct CreateStudentFee {
    pub student_id: Uuid,
    pub fee_type_id: Uuid,
    pub session_id: Uuid,
    pub amount_due_cents: i64,
    pub due_date: Option<NaiveDate>,
}

/// Fee transaction repository trait
#[async_trait]
pub trait FeeTransactionRepository: Send + Sync {
    /// Record a payment atomically.
    ///
    /// In one transaction: lock the student fee row, re-check the balance,
    /// apply the increment, and append the transaction row. NotFound when the
    /// student fee does not exist; `InsufficientBalance` when the increment
    /// would push amount_paid past amount_due (nothing is written).
    async fn record_payment(&self, payment: RecordPayment) -> DbResult<PaymentOutcome>;

    /// Find a transaction by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeTransactionRow>>;

    /// Find a transaction by receipt number
    async fn find_by_receipt(&self, receipt_no: &str) -> DbResult<Option<FeeTransactionRow>>;

    /// List recent transactions, newest first
    async fn list(&self, limit: i64) -> DbResult<Vec<FeeTransactionRow>>;

    /// Sum amount and count over a payment-date range
    async fn totals_for_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<CollectionTotals>;

    /// Per-payment-mode totals over a payment-date range
    async fn totals_by_mode(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<ModeTotalsRow>>;

    /// Per-day totals over a payment-date range
    async fn daily_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DayTotalsRow>>;
}

/// Record payment input
#[derive(Debug, Clone)]
pub struct RecordPayment {
    pub student_fee_id: Uuid,
    pub receipt_no: String,
    pub amount_cents: i64,
    pub payment_mode: String,
    pub reference_no: Option<String>,
    pub collected_by: Uuid,
}

/// Result of an attempted payment
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    /// Payment applied; both rows reflect the committed state
    Recorded {
        transaction: FeeTransactionRow,
        fee: StudentFeeRow,
    },
    /// The increment would exceed amount_due; nothing was written
    InsufficientBalance { fee: StudentFeeRow },
}
