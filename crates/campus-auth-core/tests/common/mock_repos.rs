//! Mock repositories for testing

use async_trait::async_trait;
use campus_db::{
    AuthTokenRepository, AuthTokenRow, CreateAuthToken, CreateUser, DbError, DbResult,
    UpdateUser, UserRepository, UserRow,
};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<Uuid, UserRow>>,
    by_email: Arc<DashMap<String, Uuid>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user row directly
    pub fn insert_user(&self, user: UserRow) {
        self.by_email.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    /// Build a user row with the given credentials
    pub fn test_user(email: &str, password_hash: &str, role: &str, active: bool) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .by_email
            .get(email)
            .and_then(|id| self.users.get(id.value()).map(|r| r.value().clone())))
    }

    async fn list(&self) -> DbResult<Vec<UserRow>> {
        Ok(self.users.iter().map(|r| r.value().clone()).collect())
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        if self.by_email.contains_key(&user.email) {
            return Err(DbError::Conflict("users_email_key".to_string()));
        }
        let row = UserRow {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            active: user.active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.insert_user(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, update: UpdateUser) -> DbResult<UserRow> {
        let mut user = self.users.get_mut(&id).ok_or(DbError::NotFound)?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            self.by_email.remove(&user.email);
            self.by_email.insert(email.clone(), id);
            user.email = email;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(active) = update.active {
            user.active = active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> DbResult<()> {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.by_email.remove(&user.email);
                Ok(())
            }
            None => Err(DbError::NotFound),
        }
    }
}

/// In-memory token repository for testing
#[derive(Default, Clone)]
pub struct MockAuthTokenRepository {
    tokens: Arc<DashMap<Uuid, AuthTokenRow>>,
    by_hash: Arc<DashMap<String, Uuid>>,
}

impl MockAuthTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of live (not revoked, not expired) rows
    #[allow(dead_code)]
    pub fn live_count(&self) -> usize {
        self.tokens.iter().filter(|r| r.value().is_valid()).count()
    }
}

#[async_trait]
impl AuthTokenRepository for MockAuthTokenRepository {
    async fn create(&self, token: CreateAuthToken) -> DbResult<AuthTokenRow> {
        let row = AuthTokenRow {
            id: token.id,
            user_id: token.user_id,
            token_hash: token.token_hash.clone(),
            created_at: Utc::now(),
            expires_at: token.expires_at,
            revoked: false,
        };
        self.by_hash.insert(token.token_hash, token.id);
        self.tokens.insert(token.id, row.clone());
        Ok(row)
    }

    async fn find_valid_by_hash(&self, token_hash: &str) -> DbResult<Option<AuthTokenRow>> {
        Ok(self
            .by_hash
            .get(token_hash)
            .and_then(|id| self.tokens.get(id.value()).map(|r| r.value().clone()))
            .filter(|row| row.is_valid()))
    }

    async fn revoke(&self, id: Uuid) -> DbResult<bool> {
        match self.tokens.get_mut(&id) {
            Some(mut row) if !row.revoked => {
                row.revoked = true;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        let mut count = 0;
        for mut row in self.tokens.iter_mut() {
            if row.user_id == user_id && !row.revoked {
                row.revoked = true;
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_user_repo_crud() {
        let repo = MockUserRepository::new();

        let user = repo
            .create(CreateUser {
                id: Uuid::new_v4(),
                name: "Mock Admin".to_string(),
                email: "admin@school.test".to_string(),
                password_hash: "hash".to_string(),
                role: "admin".to_string(),
                active: true,
            })
            .await
            .unwrap();

        assert!(repo.find_by_id(user.id).await.unwrap().is_some());
        assert!(repo
            .find_by_email("admin@school.test")
            .await
            .unwrap()
            .is_some());

        // Duplicate email conflicts
        let dup = repo
            .create(CreateUser {
                id: Uuid::new_v4(),
                name: "Other".to_string(),
                email: "admin@school.test".to_string(),
                password_hash: "hash".to_string(),
                role: "teacher".to_string(),
                active: true,
            })
            .await;
        assert!(matches!(dup, Err(DbError::Conflict(_))));

        repo.delete(user.id).await.unwrap();
        assert!(repo.find_by_id(user.id).await.unwrap().is_none());
        assert!(matches!(repo.delete(user.id).await, Err(DbError::NotFound)));
    }

    #[tokio::test]
    async fn test_mock_token_repo_revocation() {
        let repo = MockAuthTokenRepository::new();
        let user_id = Uuid::new_v4();

        for i in 0..3 {
            repo.create(CreateAuthToken {
                id: Uuid::new_v4(),
                user_id,
                token_hash: format!("digest-{i}"),
                expires_at: Utc::now() + chrono::Duration::hours(24),
            })
            .await
            .unwrap();
        }

        assert!(repo.find_valid_by_hash("digest-1").await.unwrap().is_some());
        assert_eq!(repo.revoke_all_for_user(user_id).await.unwrap(), 3);
        assert!(repo.find_valid_by_hash("digest-1").await.unwrap().is_none());
        // Second sweep revokes nothing
        assert_eq!(repo.revoke_all_for_user(user_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_token_repo_expiry() {
        let repo = MockAuthTokenRepository::new();

        repo.create(CreateAuthToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "stale".to_string(),
            expires_at: Utc::now() - chrono::Duration::minutes(1),
        })
        .await
        .unwrap();

        assert!(repo.find_valid_by_hash("stale").await.unwrap().is_none());
    }
}
