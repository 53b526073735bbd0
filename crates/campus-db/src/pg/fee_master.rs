//! PostgreSQL fee master (class-level template) repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{FeeMasterDetailRow, FeeMasterRow};
use crate::repo::{CreateFeeMaster, FeeMasterRepository};

const MASTER_COLUMNS: &str =
    "id, fee_group_id, fee_type_id, class_id, session_id, amount_cents, created_at";

/// PostgreSQL fee master repository
#[derive(Clone)]
pub struct PgFeeMasterRepository {
    pool: PgPool,
}

impl PgFeeMasterRepository {
    /// Create a new fee master repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeeMasterRepository for PgFeeMasterRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeMasterRow>> {
        let master = sqlx::query_as::<_, FeeMasterRow>(&format!(
            "SELECT {MASTER_COLUMNS} FROM fee_master WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(master)
    }

    async fn list(
        &self,
        session_id: Option<Uuid>,
        class_id: Option<Uuid>,
    ) -> DbResult<Vec<FeeMasterRow>> {
        let masters = sqlx::query_as::<_, FeeMasterRow>(&format!(
            r#"
            SELECT {MASTER_COLUMNS} FROM fee_master
            WHERE ($1::uuid IS NULL OR session_id = $1)
              AND ($2::uuid IS NULL OR class_id = $2)
            ORDER BY created_at
            "#
        ))
        .bind(session_id)
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(masters)
    }

    async fn list_for_class(
        &self,
        class_id: Uuid,
        session_id: Uuid,
    ) -> DbResult<Vec<FeeMasterDetailRow>> {
        let masters = sqlx::query_as::<_, FeeMasterDetailRow>(
            r#"
            SELECT m.id, m.fee_group_id, m.fee_type_id, t.name AS fee_type_name,
                   m.class_id, m.session_id, m.amount_cents, t.due_date
            FROM fee_master m
            JOIN fee_types t ON m.fee_type_id = t.id
            WHERE m.class_id = $1 AND m.session_id = $2
            ORDER BY t.name
            "#,
        )
        .bind(class_id)
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(masters)
    }

    async fn create(&self, master: CreateFeeMaster) -> DbResult<FeeMasterRow> {
        let row = sqlx::query_as::<_, FeeMasterRow>(&format!(
            r#"
            INSERT INTO fee_master (id, fee_group_id, fee_type_id, class_id, session_id, amount_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {MASTER_COLUMNS}
            "#
        ))
        .bind(master.id)
        .bind(master.fee_group_id)
        .bind(master.fee_type_id)
        .bind(master.class_id)
        .bind(master.session_id)
        .bind(master.amount_cents)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_amount(&self, id: Uuid, amount_cents: i64) -> DbResult<FeeMasterRow> {
        let row = sqlx::query_as::<_, FeeMasterRow>(&format!(
            "UPDATE fee_master SET amount_cents = $2 WHERE id = $1 RETURNING {MASTER_COLUMNS}"
        ))
        .bind(id)
        .bind(amount_cents)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM fee_master WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
