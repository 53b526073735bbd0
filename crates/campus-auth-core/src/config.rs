//! Configuration for the auth service

use std::time::Duration;

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for token signing (must be at least 32 bytes)
    pub token_secret: String,
    /// How long issued tokens stay valid
    pub token_ttl: Duration,
}

impl AuthConfig {
    /// Default token lifetime.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create a config with the default 24-hour token lifetime.
    pub fn new(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl: Self::DEFAULT_TTL,
        }
    }

    /// Set the token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}
