//! Login, logout, and current-user handlers

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

use campus_db::UserRepository;
use campus_types::ApiResponse;

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::handlers::shared::record_op_duration;
use crate::handlers::users::UserView;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserView,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/login
#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    let start = Instant::now();

    let issued = match state.auth.login(&req.email, &req.password).await {
        Ok(issued) => issued,
        Err(e) => {
            metrics::counter!("campus_logins_total", "result" => "err").increment(1);
            record_op_duration("login", start, false);
            return Err(e.into());
        }
    };

    metrics::counter!("campus_logins_total", "result" => "ok").increment(1);
    record_op_duration("login", start, true);

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: UserView::from(issued.user),
    })))
}

/// POST /api/v1/logout
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.auth.logout(user.token_id).await?;

    record_op_duration("logout", start, true);

    Ok(Json(ApiResponse::message_only("logged out")))
}

/// GET /api/v1/me
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ApiResponse<UserView>>> {
    let row = state
        .repos
        .users
        .find_by_id(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", user.user_id)))?;

    Ok(Json(ApiResponse::ok(UserView::from(row))))
}
