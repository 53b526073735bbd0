//! PostgreSQL fee group repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::FeeGroupRow;
use crate::repo::{CreateFeeGroup, FeeGroupRepository, UpdateFeeGroup};

const GROUP_COLUMNS: &str = "id, name, description, session_id, created_at";

/// PostgreSQL fee group repository
#[derive(Clone)]
pub struct PgFeeGroupRepository {
    pool: PgPool,
}

impl PgFeeGroupRepository {
    /// Create a new fee group repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeeGroupRepository for PgFeeGroupRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<FeeGroupRow>> {
        let group = sqlx::query_as::<_, FeeGroupRow>(&format!(
            "SELECT {GROUP_COLUMNS} FROM fee_groups WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(group)
    }

    async fn list(&self, session_id: Option<Uuid>) -> DbResult<Vec<FeeGroupRow>> {
        let groups = sqlx::query_as::<_, FeeGroupRow>(&format!(
            r#"
            SELECT {GROUP_COLUMNS} FROM fee_groups
            WHERE ($1::uuid IS NULL OR session_id = $1)
            ORDER BY name
            "#
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    async fn create(&self, group: CreateFeeGroup) -> DbResult<FeeGroupRow> {
        let row = sqlx::query_as::<_, FeeGroupRow>(&format!(
            r#"
            INSERT INTO fee_groups (id, name, description, session_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(group.id)
        .bind(&group.name)
        .bind(group.description)
        .bind(group.session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateFeeGroup) -> DbResult<FeeGroupRow> {
        let row = sqlx::query_as::<_, FeeGroupRow>(&format!(
            r#"
            UPDATE fee_groups
            SET name = COALESCE($2, name),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM fee_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
