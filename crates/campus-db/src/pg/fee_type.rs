//! PostgreSQL fee type repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::FeeTypeRow;
use crate::repo::{CreateFeeType, FeeTypeRepository, UpdateFeeType};

const TYPE_COLUMNS: &str =
    "id, name, description, amount_cents, fee_group_id, session_id, frequency, due_date, created_at";

/// PostgreSQL fee type repository
#[derive(Clone)]
pub struct PgFeeTypeRepository {
    pool: PgPool,
}

impl PgFeeTypeRepository {
    /// Create a new fee type repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeeTypeRepository for PgFeeTypeRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeTypeRow>> {
        let fee_type = sqlx::query_as::<_, FeeTypeRow>(&format!(
            "SELECT {TYPE_COLUMNS} FROM fee_types WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(fee_type)
    }

    async fn list(
        &self,
        session_id: Option<Uuid>,
        fee_group_id: Option<Uuid>,
    ) -> DbResult<Vec<FeeTypeRow>> {
        let fee_types = sqlx::query_as::<_, FeeTypeRow>(&format!(
            r#"
            SELECT {TYPE_COLUMNS} FROM fee_types
            WHERE ($1::uuid IS NULL OR session_id = $1)
              AND ($2::uuid IS NULL OR fee_group_id = $2)
            ORDER BY name
            "#
        ))
        .bind(session_id)
        .bind(fee_group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(fee_types)
    }

    async fn create(&self, fee_type: CreateFeeType) -> DbResult<FeeTypeRow> {
        let row = sqlx::query_as::<_, FeeTypeRow>(&format!(
            r#"
            INSERT INTO fee_types (id, name, description, amount_cents, fee_group_id,
                                   session_id, frequency, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {TYPE_COLUMNS}
            "#
        ))
        .bind(fee_type.id)
        .bind(&fee_type.name)
        .bind(fee_type.description)
        .bind(fee_type.amount_cents)
        .bind(fee_type.fee_group_id)
        .bind(fee_type.session_id)
        .bind(&fee_type.frequency)
        .bind(fee_type.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateFeeType) -> DbResult<FeeTypeRow> {
        let row = sqlx::query_as::<_, FeeTypeRow>(&format!(
            r#"
            UPDATE fee_types
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                amount_cents = COALESCE($4, amount_cents),
                frequency = COALESCE($5, frequency),
                due_date = COALESCE($6, due_date)
            WHERE id = $1
            RETURNING {TYPE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.amount_cents)
        .bind(update.frequency)
        .bind(update.due_date)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM fee_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
