//! Fee service: assignment fan-out, guarded payment collection, summaries,
//! and collection reports.
//!
//! Writes delegate to single repository methods that each own one
//! transaction, so the service never holds partial state across a failure.
//! Fee status is never stored; it is derived from the amounts and due date
//! at read time.

use campus_db::pg::{
    PgFeeMasterRepository, PgFeeTransactionRepository, PgStudentFeeRepository,
    PgStudentRepository,
};
use campus_db::{
    CreateStudentFee, DayTotalsRow, DbError, FeeMasterRepository, FeeTransactionRepository,
    FeeTransactionRow, ModeTotalsRow, PaymentOutcome, RecordPayment, StudentFeeDetailRow,
    StudentFeeFilter, StudentFeeRepository, StudentFeeRow, StudentRepository,
};
use campus_types::{FeeStatus, PaymentMode};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::FeeError;
use crate::receipt;

/// Input for collecting one payment.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub student_fee_id: Uuid,
    pub amount_cents: i64,
    pub mode: PaymentMode,
    pub reference_no: Option<String>,
    pub collected_by: Uuid,
}

/// A committed payment: the transaction row, the updated fee, and its
/// freshly derived status.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub transaction: FeeTransactionRow,
    pub fee: StudentFeeRow,
    pub status: FeeStatus,
}

/// Counts from one assignment fan-out.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AssignmentOutcome {
    /// Fee templates matched for the class/session
    pub templates: usize,
    /// Active students matched in the class/session
    pub students: usize,
    /// Student fee rows inserted or refreshed
    pub written: u64,
}

/// One student fee with its derived status, as presented to callers.
#[derive(Debug, Clone, Serialize)]
pub struct FeeSummaryLine {
    pub student_fee_id: Uuid,
    pub student_id: Uuid,
    pub fee_type_id: Uuid,
    pub fee_type_name: String,
    pub fee_group_name: String,
    pub session_id: Uuid,
    pub amount_due_cents: i64,
    pub amount_paid_cents: i64,
    pub outstanding_cents: i64,
    pub due_date: Option<NaiveDate>,
    pub status: FeeStatus,
}

impl FeeSummaryLine {
    fn from_row(row: StudentFeeDetailRow, today: NaiveDate) -> Self {
        let status = FeeStatus::derive(
            row.amount_due_cents,
            row.amount_paid_cents,
            row.due_date,
            today,
        );
        Self {
            student_fee_id: row.id,
            student_id: row.student_id,
            fee_type_id: row.fee_type_id,
            outstanding_cents: row.outstanding_cents(),
            fee_type_name: row.fee_type_name,
            fee_group_name: row.fee_group_name,
            session_id: row.session_id,
            amount_due_cents: row.amount_due_cents,
            amount_paid_cents: row.amount_paid_cents,
            due_date: row.due_date,
            status,
        }
    }
}

/// Aggregated fee position of one student within their session.
#[derive(Debug, Clone, Serialize)]
pub struct StudentFeeSummary {
    pub student_id: Uuid,
    pub session_id: Uuid,
    pub total_due_cents: i64,
    pub total_paid_cents: i64,
    pub outstanding_cents: i64,
    pub fees: Vec<FeeSummaryLine>,
}

/// Per-payment-mode totals.
#[derive(Debug, Clone, Serialize)]
pub struct ModeBreakdown {
    pub mode: String,
    pub total_cents: i64,
    pub count: i64,
}

impl From<ModeTotalsRow> for ModeBreakdown {
    fn from(row: ModeTotalsRow) -> Self {
        Self {
            mode: row.payment_mode,
            total_cents: row.total_cents,
            count: row.count,
        }
    }
}

/// Per-day totals.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DayBreakdown {
    pub day: NaiveDate,
    pub total_cents: i64,
    pub count: i64,
}

impl From<DayTotalsRow> for DayBreakdown {
    fn from(row: DayTotalsRow) -> Self {
        Self {
            day: row.day,
            total_cents: row.total_cents,
            count: row.count,
        }
    }
}

/// Collections recorded on one day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyCollections {
    pub date: NaiveDate,
    pub total_cents: i64,
    pub count: i64,
    pub by_mode: Vec<ModeBreakdown>,
}

/// Collections recorded within one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyCollections {
    pub year: i32,
    pub month: u32,
    pub total_cents: i64,
    pub count: i64,
    pub by_mode: Vec<ModeBreakdown>,
    pub by_day: Vec<DayBreakdown>,
}

/// Collections over an arbitrary inclusive date range.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_cents: i64,
    pub count: i64,
    pub by_mode: Vec<ModeBreakdown>,
}

/// Maximum rows returned by the recent-transactions listing.
const MAX_TRANSACTION_LIMIT: i64 = 500;

/// Fee service generic over its repositories.
pub struct FeeService<M, S, F, T>
where
    M: FeeMasterRepository,
    S: StudentRepository,
    F: StudentFeeRepository,
    T: FeeTransactionRepository,
{
    masters: Arc<M>,
    students: Arc<S>,
    fees: Arc<F>,
    transactions: Arc<T>,
}

/// Fee service wired to the Postgres repositories.
pub type FeeServiceImpl = FeeService<
    PgFeeMasterRepository,
    PgStudentRepository,
    PgStudentFeeRepository,
    PgFeeTransactionRepository,
>;

impl<M, S, F, T> FeeService<M, S, F, T>
where
    M: FeeMasterRepository,
    S: StudentRepository,
    F: StudentFeeRepository,
    T: FeeTransactionRepository,
{
    /// Create a new fee service.
    pub fn new(masters: Arc<M>, students: Arc<S>, fees: Arc<F>, transactions: Arc<T>) -> Self {
        Self {
            masters,
            students,
            fees,
            transactions,
        }
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// Fan a class's fee templates out to its active students.
    ///
    /// Every (template, student) pair becomes one StudentFee row. Re-running
    /// refreshes amount_due and due_date on existing rows without touching
    /// amount_paid, so the operation is idempotent and never erases payments.
    /// A class with no templates or no students is a successful no-op.
    pub async fn assign_fees(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> Result<AssignmentOutcome, FeeError> {
        let templates = self.masters.list_for_class(class_id, session_id).await?;
        let students = self
            .students
            .list_by_class_session(class_id, session_id)
            .await?;

        if templates.is_empty() || students.is_empty() {
            return Ok(AssignmentOutcome {
                templates: templates.len(),
                students: students.len(),
                written: 0,
            });
        }

        let mut assignments = Vec::with_capacity(templates.len() * students.len());
        for template in &templates {
            for student in &students {
                assignments.push(CreateStudentFee {
                    student_id: student.id,
                    fee_type_id: template.fee_type_id,
                    session_id,
                    amount_due_cents: template.amount_cents,
                    due_date: template.due_date,
                });
            }
        }

        let written = self.fees.upsert_assignments(assignments).await?;
        tracing::info!(
            class_id = %class_id,
            session_id = %session_id,
            templates = templates.len(),
            students = students.len(),
            written,
            "Assigned fees"
        );

        Ok(AssignmentOutcome {
            templates: templates.len(),
            students: students.len(),
            written,
        })
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Collect one payment against a student fee.
    ///
    /// The amount must be positive and must not exceed the outstanding
    /// balance. The balance guard is re-checked inside the repository
    /// transaction, so two concurrent payments cannot jointly overpay; the
    /// loser is rejected with nothing written.
    pub async fn collect_payment(
        &self,
        request: PaymentRequest,
    ) -> Result<PaymentReceipt, FeeError> {
        if request.amount_cents <= 0 {
            return Err(FeeError::InvalidAmount(request.amount_cents));
        }

        let today = Utc::now().date_naive();
        let receipt_no = receipt::generate(today);

        let outcome = self
            .transactions
            .record_payment(RecordPayment {
                student_fee_id: request.student_fee_id,
                receipt_no,
                amount_cents: request.amount_cents,
                payment_mode: request.mode.as_str().to_string(),
                reference_no: request.reference_no,
                collected_by: request.collected_by,
            })
            .await
            .map_err(|err| match err {
                DbError::NotFound => FeeError::StudentFeeNotFound(request.student_fee_id),
                other => FeeError::Db(other),
            })?;

        match outcome {
            PaymentOutcome::Recorded { transaction, fee } => {
                let status = FeeStatus::derive(
                    fee.amount_due_cents,
                    fee.amount_paid_cents,
                    fee.due_date,
                    today,
                );
                tracing::info!(
                    receipt_no = %transaction.receipt_no,
                    student_fee_id = %fee.id,
                    amount_cents = transaction.amount_cents,
                    status = %status,
                    "Recorded payment"
                );
                Ok(PaymentReceipt {
                    transaction,
                    fee,
                    status,
                })
            }
            PaymentOutcome::InsufficientBalance { fee } => {
                tracing::debug!(
                    student_fee_id = %fee.id,
                    attempted_cents = request.amount_cents,
                    outstanding_cents = fee.outstanding_cents(),
                    "Rejected overpayment"
                );
                Err(FeeError::Overpayment {
                    attempted_cents: request.amount_cents,
                    outstanding_cents: fee.outstanding_cents(),
                })
            }
        }
    }

    // =========================================================================
    // Summaries
    // =========================================================================

    /// Aggregate a student's fees within their own session.
    pub async fn student_fee_summary(
        &self,
        student_id: Uuid,
    ) -> Result<StudentFeeSummary, FeeError> {
        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or(FeeError::StudentNotFound(student_id))?;

        let rows = self
            .fees
            .list_for_student(student_id, student.session_id)
            .await?;
        let today = Utc::now().date_naive();

        let mut total_due = 0;
        let mut total_paid = 0;
        let fees: Vec<FeeSummaryLine> = rows
            .into_iter()
            .map(|row| {
                total_due += row.amount_due_cents;
                total_paid += row.amount_paid_cents;
                FeeSummaryLine::from_row(row, today)
            })
            .collect();

        Ok(StudentFeeSummary {
            student_id,
            session_id: student.session_id,
            total_due_cents: total_due,
            total_paid_cents: total_paid,
            outstanding_cents: total_due - total_paid,
            fees,
        })
    }

    /// List student fees matching the filter, each with its derived status.
    pub async fn list_fees(
        &self,
        filter: StudentFeeFilter,
    ) -> Result<Vec<FeeSummaryLine>, FeeError> {
        let rows = self.fees.list(filter).await?;
        let today = Utc::now().date_naive();
        Ok(rows
            .into_iter()
            .map(|row| FeeSummaryLine::from_row(row, today))
            .collect())
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Totals for payments recorded today (UTC), with a per-mode breakdown.
    pub async fn collections_today(&self) -> Result<DailyCollections, FeeError> {
        let date = Utc::now().date_naive();
        let start = day_start(date);
        let end = start + chrono::Duration::days(1);

        let totals = self.transactions.totals_for_range(start, end).await?;
        let by_mode = self.transactions.totals_by_mode(start, end).await?;

        Ok(DailyCollections {
            date,
            total_cents: totals.total_cents,
            count: totals.count,
            by_mode: by_mode.into_iter().map(ModeBreakdown::from).collect(),
        })
    }

    /// Totals for one calendar month, with per-mode and per-day breakdowns.
    pub async fn collections_for_month(
        &self,
        year: i32,
        month: u32,
    ) -> Result<MonthlyCollections, FeeError> {
        let (start, end) = month_range(year, month)?;

        let totals = self.transactions.totals_for_range(start, end).await?;
        let by_mode = self.transactions.totals_by_mode(start, end).await?;
        let by_day = self.transactions.daily_totals(start, end).await?;

        Ok(MonthlyCollections {
            year,
            month,
            total_cents: totals.total_cents,
            count: totals.count,
            by_mode: by_mode.into_iter().map(ModeBreakdown::from).collect(),
            by_day: by_day.into_iter().map(DayBreakdown::from).collect(),
        })
    }

    /// Totals over an inclusive date range; defaults to all recorded history.
    pub async fn collection_summary(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<CollectionSummary, FeeError> {
        // NaiveDate::default() is the Unix epoch date.
        let from_date = from.unwrap_or_default();
        let to_date = to.unwrap_or_else(|| Utc::now().date_naive());
        if from_date > to_date {
            return Err(FeeError::InvalidPeriod(format!(
                "{from_date} is after {to_date}"
            )));
        }

        let start = day_start(from_date);
        let end = day_start(to_date) + chrono::Duration::days(1);

        let totals = self.transactions.totals_for_range(start, end).await?;
        let by_mode = self.transactions.totals_by_mode(start, end).await?;

        Ok(CollectionSummary {
            from: from_date,
            to: to_date,
            total_cents: totals.total_cents,
            count: totals.count,
            by_mode: by_mode.into_iter().map(ModeBreakdown::from).collect(),
        })
    }

    /// Look a transaction up by receipt number.
    pub async fn find_by_receipt(&self, receipt_no: &str) -> Result<FeeTransactionRow, FeeError> {
        self.transactions
            .find_by_receipt(receipt_no)
            .await?
            .ok_or_else(|| FeeError::ReceiptNotFound(receipt_no.to_string()))
    }

    /// Fetch one transaction by id.
    pub async fn transaction(&self, id: Uuid) -> Result<FeeTransactionRow, FeeError> {
        self.transactions
            .find_by_id(id)
            .await?
            .ok_or(FeeError::TransactionNotFound(id))
    }

    /// List recent transactions, newest first, capped at 500 rows.
    pub async fn recent_transactions(
        &self,
        limit: i64,
    ) -> Result<Vec<FeeTransactionRow>, FeeError> {
        let limit = limit.clamp(1, MAX_TRANSACTION_LIMIT);
        Ok(self.transactions.list(limit).await?)
    }
}

impl<M, S, F, T> std::fmt::Debug for FeeService<M, S, F, T>
where
    M: FeeMasterRepository,
    S: StudentRepository,
    F: StudentFeeRepository,
    T: FeeTransactionRepository,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeeService").finish_non_exhaustive()
    }
}

/// UTC midnight at the start of `date`.
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Half-open UTC range covering one calendar month.
fn month_range(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), FeeError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| FeeError::InvalidPeriod(format!("{year}-{month:02}")))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| FeeError::InvalidPeriod(format!("{year}-{month:02}")))?;

    Ok((day_start(first), day_start(next_first)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_range_midyear() {
        let (start, end) = month_range(2025, 8).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-08-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_month_range_december_wraps() {
        let (start, end) = month_range(2025, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_month_range_rejects_bad_month() {
        assert!(matches!(
            month_range(2025, 0),
            Err(FeeError::InvalidPeriod(_))
        ));
        assert!(matches!(
            month_range(2025, 13),
            Err(FeeError::InvalidPeriod(_))
        ));
    }
}
