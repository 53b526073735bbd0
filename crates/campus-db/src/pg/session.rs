//! PostgreSQL academic session repository implementation
//!
//! The activation sweep and the row write always share one transaction, so
//! readers never observe two active sessions or a half-applied switch.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{SessionDependents, SessionRow};
use crate::repo::{CreateSession, SessionRepository, UpdateSession};

const SESSION_COLUMNS: &str = "id, name, start_date, end_date, status, created_at, updated_at";

/// PostgreSQL academic session repository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>> {
        let session = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn find_active(&self) -> DbResult<Option<SessionRow>> {
        let session = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = 'active'"
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn list(&self) -> DbResult<Vec<SessionRow>> {
        let sessions = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY start_date DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        let mut tx = self.pool.begin().await?;

        if session.status == "active" {
            sqlx::query(
                "UPDATE sessions SET status = 'inactive', updated_at = NOW() WHERE status = 'active'",
            )
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            INSERT INTO sessions (id, name, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session.id)
        .bind(&session.name)
        .bind(session.start_date)
        .bind(session.end_date)
        .bind(&session.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateSession) -> DbResult<SessionRow> {
        let mut tx = self.pool.begin().await?;

        if update.status.as_deref() == Some("active") {
            sqlx::query(
                r#"
                UPDATE sessions SET status = 'inactive', updated_at = NOW()
                WHERE status = 'active' AND id <> $1
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            UPDATE sessions
            SET name = COALESCE($2, name),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.status)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                Ok(row)
            }
            None => {
                tx.rollback().await?;
                Err(DbError::NotFound)
            }
        }
    }

    async fn switch_active(&self, id: Uuid) -> DbResult<SessionRow> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE sessions SET status = 'inactive', updated_at = NOW()
            WHERE status = 'active' AND id <> $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            UPDATE sessions SET status = 'active', updated_at = NOW()
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                Ok(row)
            }
            None => {
                // Unknown id: roll the sweep back so state is untouched.
                tx.rollback().await?;
                Err(DbError::NotFound)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn dependent_counts(&self, id: Uuid) -> DbResult<SessionDependents> {
        let counts = sqlx::query_as::<_, SessionDependents>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM students WHERE session_id = $1) AS students,
                (SELECT COUNT(*) FROM classes WHERE session_id = $1) AS classes,
                (SELECT COUNT(*) FROM sections s
                    JOIN classes c ON s.class_id = c.id
                    WHERE c.session_id = $1) AS sections
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}
