//! PostgreSQL class repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::ClassRow;
use crate::repo::{ClassRepository, CreateClass};

const CLASS_COLUMNS: &str = "id, name, session_id, created_at";

/// PostgreSQL class repository
#[derive(Clone)]
pub struct PgClassRepository {
    pool: PgPool,
}

impl PgClassRepository {
    /// Create a new class repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClassRepository for PgClassRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<ClassRow>> {
        let class = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(class)
    }

    async fn list(&self, session_id: Option<Uuid>) -> DbResult<Vec<ClassRow>> {
        let classes = sqlx::query_as::<_, ClassRow>(&format!(
            r#"
            SELECT {CLASS_COLUMNS} FROM classes
            WHERE ($1::uuid IS NULL OR session_id = $1)
            ORDER BY name
            "#
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(classes)
    }

    async fn create(&self, class: CreateClass) -> DbResult<ClassRow> {
        let row = sqlx::query_as::<_, ClassRow>(&format!(
            r#"
            INSERT INTO classes (id, name, session_id)
            VALUES ($1, $2, $3)
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(class.id)
        .bind(&class.name)
        .bind(class.session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn rename(&self, id: Uuid, name: &str) -> DbResult<ClassRow> {
        let row = sqlx::query_as::<_, ClassRow>(&format!(
            "UPDATE classes SET name = $2 WHERE id = $1 RETURNING {CLASS_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DbError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
