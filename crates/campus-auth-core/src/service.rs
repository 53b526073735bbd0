//! Auth service: login, token validation, and revocation
//!
//! Issued tokens are HMAC-signed and also recorded server-side as SHA-256
//! digests, so a token must both carry a valid signature and still exist
//! unrevoked in the database to be accepted.

use campus_db::pg::{PgAuthTokenRepository, PgUserRepository};
use campus_db::{AuthTokenRepository, CreateAuthToken, UserRepository, UserRow};
use campus_types::Role;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::crypto::{hash_token, verify_password, HmacKey};
use crate::error::AuthError;
use crate::token::{sign_token, verify_token, TokenPayload};

/// Identity attached to a request after token validation.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID
    pub user_id: Uuid,
    /// User email
    pub email: String,
    /// Parsed role
    pub role: Role,
    /// Row id of the backing token record, used for logout
    pub token_id: Uuid,
}

/// A freshly issued token and the account it belongs to.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Signed bearer token to hand to the client
    pub token: String,
    /// Row id of the stored token record
    pub token_id: Uuid,
    /// When the token stops being valid
    pub expires_at: DateTime<Utc>,
    /// The authenticated user row
    pub user: UserRow,
}

/// Authentication service generic over its repositories.
pub struct AuthService<U: UserRepository, T: AuthTokenRepository> {
    config: AuthConfig,
    hmac_key: HmacKey,
    users: Arc<U>,
    tokens: Arc<T>,
}

/// Auth service wired to the Postgres repositories.
pub type AuthServiceImpl = AuthService<PgUserRepository, PgAuthTokenRepository>;

impl<U: UserRepository, T: AuthTokenRepository> AuthService<U, T> {
    /// Create a new auth service.
    ///
    /// # Errors
    /// Returns a configuration error if the token secret is under 32 bytes.
    pub fn new(config: AuthConfig, users: Arc<U>, tokens: Arc<T>) -> Result<Self, AuthError> {
        let hmac_key = HmacKey::new(config.token_secret.as_bytes())
            .map_err(|err| AuthError::Configuration(err.to_string()))?;
        Ok(Self {
            config,
            hmac_key,
            users,
            tokens,
        })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Verify credentials and issue a signed bearer token.
    ///
    /// The password check runs before the account-active check so a disabled
    /// account with a wrong password still reports invalid credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(email = %email, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.active {
            tracing::info!(user_id = %user.id, "Login rejected: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        self.issue_token(user).await
    }

    /// Sign a token for an already-verified user and store its digest.
    async fn issue_token(&self, user: UserRow) -> Result<IssuedToken, AuthError> {
        let payload = TokenPayload::new(user.id, &user.email, &user.role, self.config.token_ttl);
        let token = sign_token(&self.hmac_key, &payload)?;

        // DB expiry mirrors the payload expiry exactly.
        let expires_at = DateTime::from_timestamp_millis(payload.expires)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;

        let token_id = Uuid::new_v4();
        let create = CreateAuthToken {
            id: token_id,
            user_id: user.id,
            token_hash: hash_token(&token),
            expires_at,
        };
        self.tokens.create(create).await?;

        tracing::info!(user_id = %user.id, token_id = %token_id, "Issued auth token");
        Ok(IssuedToken {
            token,
            token_id,
            expires_at,
            user,
        })
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate a bearer token: signature, expiry, then server-side record.
    ///
    /// A correctly signed token with no live database record is treated as
    /// revoked and rejected.
    pub async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let payload = verify_token(&self.hmac_key, token)?;

        let digest = hash_token(token);
        let record = self
            .tokens
            .find_valid_by_hash(&digest)
            .await?
            .ok_or(AuthError::TokenRevoked)?;

        let role: Role = payload.role.parse().map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id: payload.user_id,
            email: payload.email,
            role,
            token_id: record.id,
        })
    }

    // =========================================================================
    // Revocation
    // =========================================================================

    /// Revoke a single token by its record id; returns whether a live row was revoked.
    pub async fn logout(&self, token_id: Uuid) -> Result<bool, AuthError> {
        let revoked = self.tokens.revoke(token_id).await?;
        if revoked {
            tracing::info!(token_id = %token_id, "Token revoked");
        }
        Ok(revoked)
    }

    /// Revoke every token a user holds; returns the number revoked.
    ///
    /// Called on password change and account deactivation.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, AuthError> {
        let count = self.tokens.revoke_all_for_user(user_id).await?;
        tracing::info!(user_id = %user_id, count, "Revoked all tokens for user");
        Ok(count)
    }
}

impl<U: UserRepository, T: AuthTokenRepository> std::fmt::Debug for AuthService<U, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl", &self.config.token_ttl)
            .finish_non_exhaustive()
    }
}
