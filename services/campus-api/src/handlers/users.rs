//! User management handlers
//!
//! Admin-gated CRUD over staff accounts. Password hashes never leave the
//! server; a password change revokes every outstanding token for the account.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_auth_core::hash_password;
use campus_db::{CreateUser, UpdateUser, UserRepository, UserRow};
use campus_types::{ApiResponse, Role};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AdminUser;
use crate::handlers::shared::{
    record_op_duration, validate_email, validate_name, validate_password,
};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// User as presented to clients; the password hash is stripped.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserView {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub active: Option<bool>,
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    value
        .parse::<Role>()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/users
#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<ApiResponse<Vec<UserView>>>> {
    let users = state.repos.users.list().await?;

    Ok(Json(ApiResponse::ok(
        users.into_iter().map(UserView::from).collect(),
    )))
}

/// POST /api/v1/users
#[instrument(skip(state, _admin, req), fields(email = %req.email, role = %req.role))]
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserView>>> {
    let start = Instant::now();

    let name = validate_name(&req.name, "name")?;
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;
    let role = parse_role(&req.role)?;

    let password_hash = hash_password(&req.password)?;

    let user = state
        .repos
        .users
        .create(CreateUser {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            role: role.as_str().to_string(),
            active: req.active.unwrap_or(true),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User created");
    record_op_duration("create_user", start, true);

    Ok(Json(ApiResponse::ok(UserView::from(user))))
}

/// GET /api/v1/users/{id}
#[instrument(skip(state, _admin), fields(user_id = %id))]
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<UserView>>> {
    let user = state
        .repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

    Ok(Json(ApiResponse::ok(UserView::from(user))))
}

/// PUT /api/v1/users/{id}
#[instrument(skip(state, _admin, req), fields(user_id = %id))]
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<ApiResponse<UserView>>> {
    let start = Instant::now();

    let name = req
        .name
        .as_deref()
        .map(|n| validate_name(n, "name"))
        .transpose()?;
    let email = req.email.as_deref().map(validate_email).transpose()?;
    let role = req.role.as_deref().map(parse_role).transpose()?;

    let password_hash = match req.password.as_deref() {
        Some(p) => {
            validate_password(p)?;
            Some(hash_password(p)?)
        }
        None => None,
    };
    let password_changed = password_hash.is_some();

    let user = state
        .repos
        .users
        .update(
            id,
            UpdateUser {
                name,
                email,
                password_hash,
                role: role.map(|r| r.as_str().to_string()),
                active: req.active,
            },
        )
        .await?;

    // A new password invalidates every token issued for the old one
    if password_changed {
        let revoked = state.auth.revoke_all(id).await?;
        tracing::info!(user_id = %id, revoked, "Password changed, tokens revoked");
    }

    record_op_duration("update_user", start, true);

    Ok(Json(ApiResponse::ok(UserView::from(user))))
}

/// DELETE /api/v1/users/{id}
#[instrument(skip(state, admin), fields(user_id = %id, by = %admin.user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    if id == admin.user_id {
        return Err(ApiError::Validation("cannot delete your own account".into()));
    }

    state.repos.users.delete(id).await?;

    tracing::info!(user_id = %id, "User deleted");
    record_op_duration("delete_user", start, true);

    Ok(Json(ApiResponse::message_only("user deleted")))
}
