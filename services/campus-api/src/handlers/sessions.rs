//! Academic session handlers
//!
//! Lifecycle CRUD plus the active-session switch, the advisory date-overlap
//! check, and per-session statistics. All mutation goes through
//! `SessionService`, which owns the single-active invariant.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_academic_core::{DateValidation, NewSession, SessionStats, SessionUpdate};
use campus_db::SessionRow;
use campus_types::{ApiResponse, SessionStatus};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AuthUser};
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Session as presented to clients
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionView {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to inactive; switching is the usual way to activate
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchSessionRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ValidateDatesRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Session to ignore, for edit forms re-checking their own range
    pub exclude: Option<Uuid>,
}

fn parse_status(value: &str) -> Result<SessionStatus, ApiError> {
    value
        .parse::<SessionStatus>()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/sessions
#[instrument(skip(state, _user))]
pub async fn list_sessions(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<ApiResponse<Vec<SessionView>>>> {
    let sessions = state.academics.list().await?;

    Ok(Json(ApiResponse::ok(
        sessions.into_iter().map(SessionView::from).collect(),
    )))
}

/// GET /api/v1/sessions/active
#[instrument(skip(state, _user))]
pub async fn active_session(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let session = state
        .academics
        .active_session()
        .await?
        .ok_or_else(|| ApiError::NotFound("no active session".into()))?;

    Ok(Json(ApiResponse::ok(SessionView::from(session))))
}

/// GET /api/v1/sessions/{id}
#[instrument(skip(state, _user), fields(session_id = %id))]
pub async fn get_session(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let session = state.academics.get(id).await?;

    Ok(Json(ApiResponse::ok(SessionView::from(session))))
}

/// POST /api/v1/sessions
#[instrument(skip(state, _admin, req), fields(name = %req.name))]
pub async fn create_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateSessionRequest>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let start = Instant::now();

    let status = match req.status.as_deref() {
        Some(s) => parse_status(s)?,
        None => SessionStatus::Inactive,
    };

    let session = state
        .academics
        .create(NewSession {
            name: req.name,
            start_date: req.start_date,
            end_date: req.end_date,
            status,
        })
        .await?;

    record_op_duration("create_session", start, true);

    Ok(Json(ApiResponse::ok(SessionView::from(session))))
}

/// PUT /api/v1/sessions/{id}
#[instrument(skip(state, _admin, req), fields(session_id = %id))]
pub async fn update_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSessionRequest>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let start = Instant::now();

    let status = req.status.as_deref().map(parse_status).transpose()?;

    let session = state
        .academics
        .update(
            id,
            SessionUpdate {
                name: req.name,
                start_date: req.start_date,
                end_date: req.end_date,
                status,
            },
        )
        .await?;

    record_op_duration("update_session", start, true);

    Ok(Json(ApiResponse::ok(SessionView::from(session))))
}

/// POST /api/v1/sessions/switch
#[instrument(skip(state, _admin, req), fields(session_id = %req.session_id))]
pub async fn switch_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<SwitchSessionRequest>,
) -> ApiResult<Json<ApiResponse<SessionView>>> {
    let start = Instant::now();

    let session = state.academics.switch_active(req.session_id).await?;

    metrics::counter!("campus_session_switches_total").increment(1);
    record_op_duration("switch_session", start, true);

    Ok(Json(ApiResponse::ok_with_message(
        SessionView::from(session),
        "active session switched",
    )))
}

/// DELETE /api/v1/sessions/{id}
#[instrument(skip(state, _admin), fields(session_id = %id))]
pub async fn delete_session(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.academics.delete(id).await?;

    record_op_duration("delete_session", start, true);

    Ok(Json(ApiResponse::message_only("session deleted")))
}

/// POST /api/v1/sessions/validate-dates
///
/// An overlap is reported as data, not as an error; the caller decides
/// whether to proceed.
#[instrument(skip(state, _admin, req))]
pub async fn validate_session_dates(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<ValidateDatesRequest>,
) -> ApiResult<Json<ApiResponse<DateValidation>>> {
    let validation = state
        .academics
        .validate_dates(req.start_date, req.end_date, req.exclude)
        .await?;

    Ok(Json(ApiResponse::ok(validation)))
}

/// GET /api/v1/sessions/{id}/stats
#[instrument(skip(state, _user), fields(session_id = %id))]
pub async fn session_stats(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<SessionStats>>> {
    let stats = state.academics.stats(id).await?;

    Ok(Json(ApiResponse::ok(stats)))
}
