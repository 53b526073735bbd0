//! Student admission handlers
//!
//! Admission records are session-scoped and carry the class/section placement
//! the fee fan-out keys on. Deactivated students stay queryable but drop out
//! of new fee assignments.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_db::{CreateStudent, StudentFilter, StudentRepository, StudentRow, UpdateStudent};
use campus_fees_core::StudentFeeSummary;
use campus_types::ApiResponse;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AuthUser};
use crate::handlers::shared::{record_op_duration, resolve_session, validate_name};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StudentView {
    pub id: Uuid,
    pub admission_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub class_id: Uuid,
    pub section_id: Option<Uuid>,
    pub session_id: Uuid,
    pub admission_date: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentRow> for StudentView {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id,
            admission_no: row.admission_no,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            guardian_name: row.guardian_name,
            class_id: row.class_id,
            section_id: row.section_id,
            session_id: row.session_id,
            admission_date: row.admission_date,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListStudentsQuery {
    pub class_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub admission_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub class_id: Uuid,
    pub section_id: Option<Uuid>,
    /// Defaults to the active session
    pub session_id: Option<Uuid>,
    /// Defaults to today
    pub admission_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub class_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub active: Option<bool>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/students
#[instrument(skip(state, _user, query))]
pub async fn list_students(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListStudentsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<StudentView>>>> {
    let students = state
        .repos
        .students
        .list(StudentFilter {
            class_id: query.class_id,
            section_id: query.section_id,
            session_id: query.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok(
        students.into_iter().map(StudentView::from).collect(),
    )))
}

/// POST /api/v1/students
#[instrument(skip(state, _admin, req), fields(admission_no = %req.admission_no))]
pub async fn create_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateStudentRequest>,
) -> ApiResult<Json<ApiResponse<StudentView>>> {
    let start = Instant::now();

    let admission_no = validate_name(&req.admission_no, "admission_no")?;
    let first_name = validate_name(&req.first_name, "first_name")?;
    let last_name = validate_name(&req.last_name, "last_name")?;
    let session_id = resolve_session(&state, req.session_id).await?;

    let student = state
        .repos
        .students
        .create(CreateStudent {
            id: Uuid::new_v4(),
            admission_no,
            first_name,
            last_name,
            email: req.email,
            phone: req.phone,
            guardian_name: req.guardian_name,
            class_id: req.class_id,
            section_id: req.section_id,
            session_id,
            admission_date: req.admission_date.unwrap_or_else(|| Utc::now().date_naive()),
        })
        .await?;

    tracing::info!(
        student_id = %student.id,
        admission_no = %student.admission_no,
        class_id = %student.class_id,
        "Student admitted"
    );
    metrics::counter!("campus_admissions_total").increment(1);
    record_op_duration("create_student", start, true);

    Ok(Json(ApiResponse::ok(StudentView::from(student))))
}

/// GET /api/v1/students/{id}
#[instrument(skip(state, _user), fields(student_id = %id))]
pub async fn get_student(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<StudentView>>> {
    let student = state
        .repos
        .students
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;

    Ok(Json(ApiResponse::ok(StudentView::from(student))))
}

/// PUT /api/v1/students/{id}
#[instrument(skip(state, _admin, req), fields(student_id = %id))]
pub async fn update_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStudentRequest>,
) -> ApiResult<Json<ApiResponse<StudentView>>> {
    let start = Instant::now();

    let first_name = req
        .first_name
        .as_deref()
        .map(|n| validate_name(n, "first_name"))
        .transpose()?;
    let last_name = req
        .last_name
        .as_deref()
        .map(|n| validate_name(n, "last_name"))
        .transpose()?;

    let student = state
        .repos
        .students
        .update(
            id,
            UpdateStudent {
                first_name,
                last_name,
                email: req.email,
                phone: req.phone,
                guardian_name: req.guardian_name,
                class_id: req.class_id,
                section_id: req.section_id,
                active: req.active,
            },
        )
        .await?;

    record_op_duration("update_student", start, true);

    Ok(Json(ApiResponse::ok(StudentView::from(student))))
}

/// DELETE /api/v1/students/{id}
#[instrument(skip(state, _admin), fields(student_id = %id))]
pub async fn delete_student(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.repos.students.delete(id).await?;

    tracing::info!(student_id = %id, "Student deleted");
    record_op_duration("delete_student", start, true);

    Ok(Json(ApiResponse::message_only("student deleted")))
}

/// GET /api/v1/students/{id}/fee-summary
#[instrument(skip(state, _user), fields(student_id = %id))]
pub async fn student_fee_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<StudentFeeSummary>>> {
    let start = Instant::now();

    let summary = state.fees.student_fee_summary(id).await?;

    record_op_duration("student_fee_summary", start, true);

    Ok(Json(ApiResponse::ok(summary)))
}
