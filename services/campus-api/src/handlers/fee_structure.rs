//! Fee structure handlers
//!
//! Fee groups bundle fee types; fee types carry a default amount, frequency,
//! and due date; fee master rows bind a fee type to a class at a final
//! amount. Assignment fans fee master rows out to students.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_db::{
    CreateFeeGroup, CreateFeeMaster, CreateFeeType, FeeGroupRepository, FeeGroupRow,
    FeeMasterRepository, FeeMasterRow, FeeTypeRepository, FeeTypeRow, UpdateFeeGroup,
    UpdateFeeType,
};
use campus_types::{ApiResponse, FeeFrequency};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AuthUser};
use crate::handlers::shared::{record_op_duration, resolve_session, validate_amount, validate_name};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FeeGroupView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FeeGroupRow> for FeeGroupView {
    fn from(row: FeeGroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            session_id: row.session_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeeTypeView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub fee_group_id: Uuid,
    pub session_id: Uuid,
    pub frequency: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<FeeTypeRow> for FeeTypeView {
    fn from(row: FeeTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            amount_cents: row.amount_cents,
            fee_group_id: row.fee_group_id,
            session_id: row.session_id,
            frequency: row.frequency,
            due_date: row.due_date,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeeMasterView {
    pub id: Uuid,
    pub fee_group_id: Uuid,
    pub fee_type_id: Uuid,
    pub class_id: Uuid,
    pub session_id: Uuid,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl From<FeeMasterRow> for FeeMasterView {
    fn from(row: FeeMasterRow) -> Self {
        Self {
            id: row.id,
            fee_group_id: row.fee_group_id,
            fee_type_id: row.fee_type_id,
            class_id: row.class_id,
            session_id: row.session_id,
            amount_cents: row.amount_cents,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionScopeQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListFeeTypesQuery {
    pub session_id: Option<Uuid>,
    pub fee_group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListFeeMasterQuery {
    pub session_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeeGroupRequest {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the active session
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeeGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeeTypeRequest {
    pub name: String,
    pub description: Option<String>,
    pub amount_cents: i64,
    pub fee_group_id: Uuid,
    /// Defaults to the active session
    pub session_id: Option<Uuid>,
    pub frequency: String,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeeTypeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub amount_cents: Option<i64>,
    pub frequency: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeeMasterRequest {
    pub fee_group_id: Uuid,
    pub fee_type_id: Uuid,
    pub class_id: Uuid,
    /// Defaults to the active session
    pub session_id: Option<Uuid>,
    pub amount_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeeMasterRequest {
    pub amount_cents: i64,
}

fn parse_frequency(value: &str) -> Result<FeeFrequency, ApiError> {
    value
        .parse::<FeeFrequency>()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

// ============================================================================
// Fee Group Handlers
// ============================================================================

/// GET /api/v1/fee-groups
#[instrument(skip(state, _user, query))]
pub async fn list_fee_groups(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SessionScopeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FeeGroupView>>>> {
    let groups = state.repos.fee_groups.list(query.session_id).await?;

    Ok(Json(ApiResponse::ok(
        groups.into_iter().map(FeeGroupView::from).collect(),
    )))
}

/// POST /api/v1/fee-groups
#[instrument(skip(state, _admin, req), fields(name = %req.name))]
pub async fn create_fee_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateFeeGroupRequest>,
) -> ApiResult<Json<ApiResponse<FeeGroupView>>> {
    let start = Instant::now();

    let name = validate_name(&req.name, "fee group name")?;
    let session_id = resolve_session(&state, req.session_id).await?;

    let group = state
        .repos
        .fee_groups
        .create(CreateFeeGroup {
            id: Uuid::new_v4(),
            name,
            description: req.description,
            session_id,
        })
        .await?;

    tracing::info!(fee_group_id = %group.id, session_id = %session_id, "Fee group created");
    record_op_duration("create_fee_group", start, true);

    Ok(Json(ApiResponse::ok(FeeGroupView::from(group))))
}

/// PUT /api/v1/fee-groups/{id}
#[instrument(skip(state, _admin, req), fields(fee_group_id = %id))]
pub async fn update_fee_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFeeGroupRequest>,
) -> ApiResult<Json<ApiResponse<FeeGroupView>>> {
    let start = Instant::now();

    let name = req
        .name
        .as_deref()
        .map(|n| validate_name(n, "fee group name"))
        .transpose()?;

    let group = state
        .repos
        .fee_groups
        .update(
            id,
            UpdateFeeGroup {
                name,
                description: req.description,
            },
        )
        .await?;

    record_op_duration("update_fee_group", start, true);

    Ok(Json(ApiResponse::ok(FeeGroupView::from(group))))
}

/// DELETE /api/v1/fee-groups/{id}
#[instrument(skip(state, _admin), fields(fee_group_id = %id))]
pub async fn delete_fee_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.repos.fee_groups.delete(id).await?;

    tracing::info!(fee_group_id = %id, "Fee group deleted");
    record_op_duration("delete_fee_group", start, true);

    Ok(Json(ApiResponse::message_only("fee group deleted")))
}

// ============================================================================
// Fee Type Handlers
// ============================================================================

/// GET /api/v1/fee-types
#[instrument(skip(state, _user, query))]
pub async fn list_fee_types(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListFeeTypesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FeeTypeView>>>> {
    let types = state
        .repos
        .fee_types
        .list(query.session_id, query.fee_group_id)
        .await?;

    Ok(Json(ApiResponse::ok(
        types.into_iter().map(FeeTypeView::from).collect(),
    )))
}

/// POST /api/v1/fee-types
#[instrument(skip(state, _admin, req), fields(name = %req.name, frequency = %req.frequency))]
pub async fn create_fee_type(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateFeeTypeRequest>,
) -> ApiResult<Json<ApiResponse<FeeTypeView>>> {
    let start = Instant::now();

    let name = validate_name(&req.name, "fee type name")?;
    validate_amount(req.amount_cents)?;
    let frequency = parse_frequency(&req.frequency)?;
    let session_id = resolve_session(&state, req.session_id).await?;

    let fee_type = state
        .repos
        .fee_types
        .create(CreateFeeType {
            id: Uuid::new_v4(),
            name,
            description: req.description,
            amount_cents: req.amount_cents,
            fee_group_id: req.fee_group_id,
            session_id,
            frequency: frequency.as_str().to_string(),
            due_date: req.due_date,
        })
        .await?;

    tracing::info!(fee_type_id = %fee_type.id, session_id = %session_id, "Fee type created");
    record_op_duration("create_fee_type", start, true);

    Ok(Json(ApiResponse::ok(FeeTypeView::from(fee_type))))
}

/// PUT /api/v1/fee-types/{id}
#[instrument(skip(state, _admin, req), fields(fee_type_id = %id))]
pub async fn update_fee_type(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFeeTypeRequest>,
) -> ApiResult<Json<ApiResponse<FeeTypeView>>> {
    let start = Instant::now();

    let name = req
        .name
        .as_deref()
        .map(|n| validate_name(n, "fee type name"))
        .transpose()?;
    if let Some(amount) = req.amount_cents {
        validate_amount(amount)?;
    }
    let frequency = req.frequency.as_deref().map(parse_frequency).transpose()?;

    let fee_type = state
        .repos
        .fee_types
        .update(
            id,
            UpdateFeeType {
                name,
                description: req.description,
                amount_cents: req.amount_cents,
                frequency: frequency.map(|f| f.as_str().to_string()),
                due_date: req.due_date,
            },
        )
        .await?;

    record_op_duration("update_fee_type", start, true);

    Ok(Json(ApiResponse::ok(FeeTypeView::from(fee_type))))
}

/// DELETE /api/v1/fee-types/{id}
#[instrument(skip(state, _admin), fields(fee_type_id = %id))]
pub async fn delete_fee_type(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.repos.fee_types.delete(id).await?;

    tracing::info!(fee_type_id = %id, "Fee type deleted");
    record_op_duration("delete_fee_type", start, true);

    Ok(Json(ApiResponse::message_only("fee type deleted")))
}

// ============================================================================
// Fee Master Handlers
// ============================================================================

/// GET /api/v1/fee-master
#[instrument(skip(state, _user, query))]
pub async fn list_fee_master(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListFeeMasterQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FeeMasterView>>>> {
    let masters = state
        .repos
        .fee_masters
        .list(query.session_id, query.class_id)
        .await?;

    Ok(Json(ApiResponse::ok(
        masters.into_iter().map(FeeMasterView::from).collect(),
    )))
}

/// POST /api/v1/fee-master
#[instrument(
    skip(state, _admin, req),
    fields(fee_type_id = %req.fee_type_id, class_id = %req.class_id)
)]
pub async fn create_fee_master(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<CreateFeeMasterRequest>,
) -> ApiResult<Json<ApiResponse<FeeMasterView>>> {
    let start = Instant::now();

    validate_amount(req.amount_cents)?;
    let session_id = resolve_session(&state, req.session_id).await?;

    let master = state
        .repos
        .fee_masters
        .create(CreateFeeMaster {
            id: Uuid::new_v4(),
            fee_group_id: req.fee_group_id,
            fee_type_id: req.fee_type_id,
            class_id: req.class_id,
            session_id,
            amount_cents: req.amount_cents,
        })
        .await?;

    tracing::info!(
        fee_master_id = %master.id,
        class_id = %master.class_id,
        amount_cents = master.amount_cents,
        "Fee template created"
    );
    record_op_duration("create_fee_master", start, true);

    Ok(Json(ApiResponse::ok(FeeMasterView::from(master))))
}

/// PUT /api/v1/fee-master/{id}
///
/// Only the amount is updatable; re-running assignment pushes the new amount
/// to already-assigned rows without touching payments.
#[instrument(skip(state, _admin, req), fields(fee_master_id = %id))]
pub async fn update_fee_master(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFeeMasterRequest>,
) -> ApiResult<Json<ApiResponse<FeeMasterView>>> {
    let start = Instant::now();

    validate_amount(req.amount_cents)?;

    let master = state
        .repos
        .fee_masters
        .update_amount(id, req.amount_cents)
        .await?;

    record_op_duration("update_fee_master", start, true);

    Ok(Json(ApiResponse::ok(FeeMasterView::from(master))))
}

/// DELETE /api/v1/fee-master/{id}
#[instrument(skip(state, _admin), fields(fee_master_id = %id))]
pub async fn delete_fee_master(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let start = Instant::now();

    state.repos.fee_masters.delete(id).await?;

    tracing::info!(fee_master_id = %id, "Fee template deleted");
    record_op_duration("delete_fee_master", start, true);

    Ok(Json(ApiResponse::message_only("fee template deleted")))
}
