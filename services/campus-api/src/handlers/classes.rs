//! Class and section handlers
//!
//! Classes are session-scoped; sections always hang off one class. Both feed
//! the session statistics and the fee assignment fan-out.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_db::{
    ClassRepository, ClassRow, CreateClass, CreateSection, SectionRepository, SectionRow,
};
use campus_types::ApiResponse;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AuthUser};
use crate::handlers::shared::{record_op_duration, resolve_session, validate_name};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ClassView {
    pub id: Uuid,
    pub name: String,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ClassRow> for ClassView {
    fn from(row: ClassRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            session_id: row.session_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub id: Uuid,
    pub name: String,
    pub class_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<SectionRow> for SectionView {
    fn from(row: SectionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            class_id: row.class_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListClassesQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: String,
    /// Defaults to the active session
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RenameClassRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub name: String,
}

// ============================================================================
// Class Handlers
// ============================================================================

/// GET /api/v1/classes
#[instrument(skip(state, _user, query))]
pub async fn list_classes(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListClassesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<ClassView>>>> {
    let classes = state.repos.classes.list(query.session_id).await?;

    Ok(Json(ApiResponse::ok(
        classes.into_iter().map(ClassView::from).collect(),
    )))
}

/// POST /api/v1/classes
#[instrument(skip(state, _admin, req), fields(name = %req.name))]
pub async fn create_class(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateClassRequest>,
) -> ApiResult<Json<ApiResponse<ClassView>>> {
    let start = Instant::now();

    let name = validate_name(&req.name, "class name")?;
    let session_id = resolve_session(&state, req.session_id).await?;

    let class = state
        .repos
        .classes
        .create(CreateClass {
            id: Uuid::new_v4(),
            name,
            session_id,
        })
        .await?;

    tracing::info!(class_id = %class.id, session_id = %session_id, "Class created");
    record_op_duration("create_class", start, true);

    Ok(Json(ApiResponse::ok(ClassView::from(class))))
}

/// GET /api/v1/classes/{id}
#[instrument(skip(state, _user), fields(class_id = %id))]
pub async fn get_class(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<ClassView>>> {
    let class = state
        .repos
        .classes
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("class {id} not found")))?;

    Ok(Json(ApiResponse::ok(ClassView::from(class))))
}

/// PUT /api/v1/classes/{id}
#[instrument(skip(state, _admin, req), fields(class_id = %id))]
pub async fn rename_class(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameClassRequest>,
) -> ApiResult<Json<ApiResponse<ClassView>>> {
    let start = Instant::now();

    let name = validate_name(&req.name, "class name")?;
    let class = state.repos.classes.rename(id, &name).await?;

    record_op_duration("rename_class", start, true);

    Ok(Json(ApiResponse::ok(ClassView::from(class))))
}

/// DELETE /api/v1/classes/{id}
#[instrument(skip(state, _admin), fields(class_id = %id))]
pub async fn delete_class(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.repos.classes.delete(id).await?;

    tracing::info!(class_id = %id, "Class deleted");
    record_op_duration("delete_class", start, true);

    Ok(Json(ApiResponse::message_only("class deleted")))
}

// ============================================================================
// Section Handlers
// ============================================================================

/// GET /api/v1/classes/{id}/sections
#[instrument(skip(state, _user), fields(class_id = %id))]
pub async fn list_sections(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<SectionView>>>> {
    // Listing a missing class is a 404, not an empty list
    state
        .repos
        .classes
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("class {id} not found")))?;

    let sections = state.repos.sections.list_by_class(id).await?;

    Ok(Json(ApiResponse::ok(
        sections.into_iter().map(SectionView::from).collect(),
    )))
}

/// POST /api/v1/classes/{id}/sections
#[instrument(skip(state, _admin, req), fields(class_id = %id, name = %req.name))]
pub async fn create_section(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateSectionRequest>,
) -> ApiResult<Json<ApiResponse<SectionView>>> {
    let start = Instant::now();

    let name = validate_name(&req.name, "section name")?;

    state
        .repos
        .classes
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("class {id} not found")))?;

    let section = state
        .repos
        .sections
        .create(CreateSection {
            id: Uuid::new_v4(),
            name,
            class_id: id,
        })
        .await?;

    tracing::info!(section_id = %section.id, class_id = %id, "Section created");
    record_op_duration("create_section", start, true);

    Ok(Json(ApiResponse::ok(SectionView::from(section))))
}

/// DELETE /api/v1/sections/{id}
#[instrument(skip(state, _admin), fields(section_id = %id))]
pub async fn delete_section(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.repos.sections.delete(id).await?;

    tracing::info!(section_id = %id, "Section deleted");
    record_op_duration("delete_section", start, true);

    Ok(Json(ApiResponse::message_only("section deleted")))
}
