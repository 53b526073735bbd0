//! PostgreSQL bearer token repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::AuthTokenRow;
use crate::repo::{AuthTokenRepository, CreateAuthToken};

const TOKEN_COLUMNS: &str = "id, user_id, token_hash, created_at, expires_at, revoked";

/// PostgreSQL bearer token repository
#[derive(Clone)]
pub struct PgAuthTokenRepository {
    pool: PgPool,
}

impl PgAuthTokenRepository {
    /// Create a new token repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthTokenRepository for PgAuthTokenRepository {
    async fn create(&self, token: CreateAuthToken) -> DbResult<AuthTokenRow> {
        let row = sqlx::query_as::<_, AuthTokenRow>(&format!(
            r#"
            INSERT INTO auth_tokens (id, user_id, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token_hash)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_valid_by_hash(&self, token_hash: &str) -> DbResult<Option<AuthTokenRow>> {
        let row = sqlx::query_as::<_, AuthTokenRow>(&format!(
            r#"
            SELECT {TOKEN_COLUMNS}
            FROM auth_tokens
            WHERE token_hash = $1 AND revoked = FALSE AND expires_at > NOW()
            "#
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn revoke(&self, id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("UPDATE auth_tokens SET revoked = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE auth_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
