//! PostgreSQL student fee repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{StudentFeeDetailRow, StudentFeeRow};
use crate::repo::{CreateStudentFee, StudentFeeFilter, StudentFeeRepository};

const FEE_COLUMNS: &str = "id, student_id, fee_type_id, session_id, amount_due_cents, \
     amount_paid_cents, due_date, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT f.id, f.student_id, f.fee_type_id, t.name AS fee_type_name,
           g.name AS fee_group_name, f.session_id, f.amount_due_cents,
           f.amount_paid_cents, f.due_date
    FROM student_fees f
    JOIN fee_types t ON f.fee_type_id = t.id
    JOIN fee_groups g ON t.fee_group_id = g.id
"#;

/// PostgreSQL student fee repository
#[derive(Clone)]
pub struct PgStudentFeeRepository {
    pool: PgPool,
}

impl PgStudentFeeRepository {
    /// Create a new student fee repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentFeeRepository for PgStudentFeeRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<StudentFeeRow>> {
        let fee = sqlx::query_as::<_, StudentFeeRow>(&format!(
            "SELECT {FEE_COLUMNS} FROM student_fees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee)
    }

    async fn list(&self, filter: StudentFeeFilter) -> DbResult<Vec<StudentFeeDetailRow>> {
        let fees = sqlx::query_as::<_, StudentFeeDetailRow>(&format!(
            r#"
            {DETAIL_SELECT}
            JOIN students s ON f.student_id = s.id
            WHERE ($1::uuid IS NULL OR f.student_id = $1)
              AND ($2::uuid IS NULL OR s.class_id = $2)
              AND ($3::uuid IS NULL OR f.session_id = $3)
            ORDER BY g.name, t.name
            "#
        ))
        .bind(filter.student_id)
        .bind(filter.class_id)
        .bind(filter.session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fees)
    }

    async fn list_for_student(
        &self,
        student_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<StudentFeeDetailRow>> {
        let fees = sqlx::query_as::<_, StudentFeeDetailRow>(&format!(
            r#"
            {DETAIL_SELECT}
            WHERE f.student_id = $1 AND f.session_id = $2
            ORDER BY g.name, t.name
            "#
        ))
        .bind(student_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fees)
    }

    async fn upsert_assignments(&self, assignments: Vec<CreateStudentFee>) -> DbResult<u64> {
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for assignment in assignments {
            let result = sqlx::query(
                r#"
                INSERT INTO student_fees (id, student_id, fee_type_id, session_id,
                                          amount_due_cents, amount_paid_cents, due_date)
                VALUES ($1, $2, $3, $4, $5, 0, $6)
                ON CONFLICT (student_id, fee_type_id, session_id)
                DO UPDATE SET amount_due_cents = EXCLUDED.amount_due_cents,
                              due_date = EXCLUDED.due_date,
                              updated_at = NOW()
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(assignment.student_id)
            .bind(assignment.fee_type_id)
            .bind(assignment.session_id)
            .bind(assignment.amount_due_cents)
            .bind(assignment.due_date)
            .execute(&mut *tx)
            .await?;

            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}
