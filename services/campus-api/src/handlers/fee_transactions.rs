//! Fee transaction lookup and collection report handlers
//!
//! Transactions are immutable once written; everything here is read-only.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_db::FeeTransactionRow;
use campus_fees_core::{CollectionSummary, DailyCollections, MonthlyCollections};
use campus_types::ApiResponse;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

/// Default page size for the transaction list
const DEFAULT_LIMIT: i64 = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub id: Uuid,
    pub receipt_no: String,
    pub student_id: Uuid,
    pub fee_type_id: Uuid,
    pub session_id: Uuid,
    pub amount_cents: i64,
    pub payment_mode: String,
    pub reference_no: Option<String>,
    pub collected_by: Uuid,
    pub payment_date: DateTime<Utc>,
}

impl From<FeeTransactionRow> for TransactionView {
    fn from(row: FeeTransactionRow) -> Self {
        Self {
            id: row.id,
            receipt_no: row.receipt_no,
            student_id: row.student_id,
            fee_type_id: row.fee_type_id,
            session_id: row.session_id,
            amount_cents: row.amount_cents,
            payment_mode: row.payment_mode,
            reference_no: row.reference_no,
            collected_by: row.collected_by,
            payment_date: row.payment_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Defaults to the beginning of records
    pub from: Option<NaiveDate>,
    /// Defaults to today
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    pub year: i32,
    pub month: u32,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/fee-transactions
#[instrument(skip(state, _user, query))]
pub async fn list_transactions(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> ApiResult<Json<ApiResponse<Vec<TransactionView>>>> {
    let transactions = state
        .fees
        .recent_transactions(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;

    Ok(Json(ApiResponse::ok(
        transactions.into_iter().map(TransactionView::from).collect(),
    )))
}

/// GET /api/v1/fee-transactions/summary
#[instrument(skip(state, _user, query), fields(from = ?query.from, to = ?query.to))]
pub async fn collection_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<ApiResponse<CollectionSummary>>> {
    let start = Instant::now();

    let summary = state.fees.collection_summary(query.from, query.to).await?;

    record_op_duration("collection_summary", start, true);

    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/v1/fee-transactions/today
#[instrument(skip(state, _user))]
pub async fn collections_today(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<ApiResponse<DailyCollections>>> {
    let start = Instant::now();

    let collections = state.fees.collections_today().await?;

    record_op_duration("collections_today", start, true);

    Ok(Json(ApiResponse::ok(collections)))
}

/// GET /api/v1/fee-transactions/monthly
#[instrument(skip(state, _user, query), fields(year = query.year, month = query.month))]
pub async fn collections_monthly(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<MonthlyQuery>,
) -> ApiResult<Json<ApiResponse<MonthlyCollections>>> {
    let start = Instant::now();

    let collections = state
        .fees
        .collections_for_month(query.year, query.month)
        .await?;

    record_op_duration("collections_monthly", start, true);

    Ok(Json(ApiResponse::ok(collections)))
}

/// GET /api/v1/fee-transactions/receipt/{no}
#[instrument(skip(state, _user), fields(receipt_no = %receipt_no))]
pub async fn get_by_receipt(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(receipt_no): Path<String>,
) -> ApiResult<Json<ApiResponse<TransactionView>>> {
    let transaction = state.fees.find_by_receipt(&receipt_no).await?;

    Ok(Json(ApiResponse::ok(TransactionView::from(transaction))))
}

/// GET /api/v1/fee-transactions/{id}
#[instrument(skip(state, _user), fields(transaction_id = %id))]
pub async fn get_transaction(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<TransactionView>>> {
    let transaction = state.fees.transaction(id).await?;

    Ok(Json(ApiResponse::ok(TransactionView::from(transaction))))
}
