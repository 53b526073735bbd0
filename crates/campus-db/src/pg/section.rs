//! PostgreSQL section repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::SectionRow;
use crate::repo::{CreateSection, SectionRepository};

const SECTION_COLUMNS: &str = "id, name, class_id, created_at";

/// PostgreSQL section repository
#[derive(Clone)]
pub struct PgSectionRepository {
    pool: PgPool,
}

impl PgSectionRepository {
    /// Create a new section repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionRepository for PgSectionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SectionRow>> {
        let section = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(section)
    }

    async fn list_by_class(&self, class_id: Uuid) -> DbResult<Vec<SectionRow>> {
        let sections = sqlx::query_as::<_, SectionRow>(&format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE class_id = $1 ORDER BY name"
        ))
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sections)
    }

    async fn create(&self, section: CreateSection) -> DbResult<SectionRow> {
        let row = sqlx::query_as::<_, SectionRow>(&format!(
            r#"
            INSERT INTO sections (id, name, class_id)
            VALUES ($1, $2, $3)
            RETURNING {SECTION_COLUMNS}
            "#
        ))
        .bind(section.id)
        .bind(&section.name)
        .bind(section.class_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
