//! PostgreSQL fee transaction repository implementation
//!
//! Payment recording locks the student fee row, re-checks the balance, then
//! applies the increment and appends the transaction row, all in one
//! transaction. The balance can therefore never exceed amount_due even under
//! concurrent collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{CollectionTotals, DayTotalsRow, FeeTransactionRow, ModeTotalsRow, StudentFeeRow};
use crate::repo::{FeeTransactionRepository, PaymentOutcome, RecordPayment};

const TX_COLUMNS: &str = "id, receipt_no, student_id, fee_type_id, session_id, amount_cents, \
     payment_mode, reference_no, collected_by, payment_date, created_at";

const FEE_COLUMNS: &str = "id, student_id, fee_type_id, session_id, amount_due_cents, \
     amount_paid_cents, due_date, created_at, updated_at";

/// PostgreSQL fee transaction repository
#[derive(Clone)]
pub struct PgFeeTransactionRepository {
    pool: PgPool,
}

impl PgFeeTransactionRepository {
    /// Create a new fee transaction repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeeTransactionRepository for PgFeeTransactionRepository {
    async fn record_payment(&self, payment: RecordPayment) -> DbResult<PaymentOutcome> {
        let mut tx = self.pool.begin().await?;

        let fee = sqlx::query_as::<_, StudentFeeRow>(&format!(
            "SELECT {FEE_COLUMNS} FROM student_fees WHERE id = $1 FOR UPDATE"
        ))
        .bind(payment.student_fee_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(fee) = fee else {
            tx.rollback().await?;
            return Err(DbError::NotFound);
        };

        if fee.amount_paid_cents + payment.amount_cents > fee.amount_due_cents {
            tx.rollback().await?;
            return Ok(PaymentOutcome::InsufficientBalance { fee });
        }

        let updated_fee = sqlx::query_as::<_, StudentFeeRow>(&format!(
            r#"
            UPDATE student_fees
            SET amount_paid_cents = amount_paid_cents + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {FEE_COLUMNS}
            "#
        ))
        .bind(payment.student_fee_id)
        .bind(payment.amount_cents)
        .fetch_one(&mut *tx)
        .await?;

        let transaction = sqlx::query_as::<_, FeeTransactionRow>(&format!(
            r#"
            INSERT INTO fee_transactions (id, receipt_no, student_id, fee_type_id, session_id,
                                          amount_cents, payment_mode, reference_no, collected_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TX_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&payment.receipt_no)
        .bind(fee.student_id)
        .bind(fee.fee_type_id)
        .bind(fee.session_id)
        .bind(payment.amount_cents)
        .bind(&payment.payment_mode)
        .bind(payment.reference_no)
        .bind(payment.collected_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PaymentOutcome::Recorded {
            transaction,
            fee: updated_fee,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeTransactionRow>> {
        let transaction = sqlx::query_as::<_, FeeTransactionRow>(&format!(
            "SELECT {TX_COLUMNS} FROM fee_transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    async fn find_by_receipt(&self, receipt_no: &str) -> DbResult<Option<FeeTransactionRow>> {
        let transaction = sqlx::query_as::<_, FeeTransactionRow>(&format!(
            "SELECT {TX_COLUMNS} FROM fee_transactions WHERE receipt_no = $1"
        ))
        .bind(receipt_no)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    async fn list(&self, limit: i64) -> DbResult<Vec<FeeTransactionRow>> {
        let transactions = sqlx::query_as::<_, FeeTransactionRow>(&format!(
            "SELECT {TX_COLUMNS} FROM fee_transactions ORDER BY payment_date DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn totals_for_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<CollectionTotals> {
        let totals = sqlx::query_as::<_, CollectionTotals>(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0)::BIGINT AS total_cents,
                   COUNT(*) AS count
            FROM fee_transactions
            WHERE payment_date >= $1 AND payment_date < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn totals_by_mode(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<ModeTotalsRow>> {
        let totals = sqlx::query_as::<_, ModeTotalsRow>(
            r#"
            SELECT payment_mode,
                   COALESCE(SUM(amount_cents), 0)::BIGINT AS total_cents,
                   COUNT(*) AS count
            FROM fee_transactions
            WHERE payment_date >= $1 AND payment_date < $2
            GROUP BY payment_mode
            ORDER BY payment_mode
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn daily_totals(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DbResult<Vec<DayTotalsRow>> {
        let totals = sqlx::query_as::<_, DayTotalsRow>(
            r#"
            SELECT (payment_date AT TIME ZONE 'UTC')::DATE AS day,
                   COALESCE(SUM(amount_cents), 0)::BIGINT AS total_cents,
                   COUNT(*) AS count
            FROM fee_transactions
            WHERE payment_date >= $1 AND payment_date < $2
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }
}
