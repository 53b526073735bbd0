//! Application state for the Campus API service.

use std::sync::Arc;

use campus_academic_core::SessionServiceImpl;
use campus_auth_core::AuthServiceImpl;
use campus_db::pg::Repositories;
use campus_db::DbPool;
use campus_fees_core::FeeServiceImpl;

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service (login, token validation, revocation)
    pub auth: Arc<AuthServiceImpl>,
    /// Session service (lifecycle, active switch, stats)
    pub academics: Arc<SessionServiceImpl>,
    /// Fee service (assignment, collection, reports)
    pub fees: Arc<FeeServiceImpl>,
    /// Repositories for the plain CRUD surfaces
    pub repos: Repositories,
    /// Database pool (readiness probe)
    pub pool: DbPool,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        auth: AuthServiceImpl,
        academics: SessionServiceImpl,
        fees: FeeServiceImpl,
        repos: Repositories,
        pool: DbPool,
        config: Config,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            academics: Arc::new(academics),
            fees: Arc::new(fees),
            repos,
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
