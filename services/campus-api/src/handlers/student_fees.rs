//! Student fee assignment and payment collection handlers

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;
use uuid::Uuid;

use campus_db::StudentFeeFilter;
use campus_fees_core::{AssignmentOutcome, FeeSummaryLine, PaymentReceipt, PaymentRequest};
use campus_types::{ApiResponse, FeeStatus, PaymentMode};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AuthUser};
use crate::handlers::shared::{record_op_duration, resolve_session};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListStudentFeesQuery {
    pub student_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignFeesRequest {
    pub class_id: Uuid,
    /// Defaults to the active session
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CollectPaymentRequest {
    pub student_fee_id: Uuid,
    pub amount_cents: i64,
    pub payment_mode: String,
    pub reference_no: Option<String>,
}

/// Receipt handed back after a recorded payment, with the fee balance as it
/// stands after the write.
#[derive(Debug, Serialize)]
pub struct PaymentReceiptView {
    pub receipt_no: String,
    pub transaction_id: Uuid,
    pub student_fee_id: Uuid,
    pub student_id: Uuid,
    pub amount_cents: i64,
    pub payment_mode: String,
    pub reference_no: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub amount_due_cents: i64,
    pub amount_paid_cents: i64,
    pub outstanding_cents: i64,
    pub status: FeeStatus,
}

impl From<PaymentReceipt> for PaymentReceiptView {
    fn from(receipt: PaymentReceipt) -> Self {
        let outstanding = receipt.fee.outstanding_cents();
        Self {
            transaction_id: receipt.transaction.id,
            receipt_no: receipt.transaction.receipt_no,
            student_fee_id: receipt.fee.id,
            student_id: receipt.fee.student_id,
            amount_cents: receipt.transaction.amount_cents,
            payment_mode: receipt.transaction.payment_mode,
            reference_no: receipt.transaction.reference_no,
            payment_date: receipt.transaction.payment_date,
            amount_due_cents: receipt.fee.amount_due_cents,
            amount_paid_cents: receipt.fee.amount_paid_cents,
            outstanding_cents: outstanding,
            status: receipt.status,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/student-fees
#[instrument(skip(state, _user, query))]
pub async fn list_student_fees(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListStudentFeesQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FeeSummaryLine>>>> {
    let fees = state
        .fees
        .list_fees(StudentFeeFilter {
            student_id: query.student_id,
            class_id: query.class_id,
            session_id: query.session_id,
        })
        .await?;

    Ok(Json(ApiResponse::ok(fees)))
}

/// POST /api/v1/student-fees/assign
///
/// Idempotent: re-running refreshes amounts on existing rows and never
/// touches recorded payments.
#[instrument(skip(state, _admin, req), fields(class_id = %req.class_id))]
pub async fn assign_fees(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<AssignFeesRequest>,
) -> ApiResult<Json<ApiResponse<AssignmentOutcome>>> {
    let start = Instant::now();

    let session_id = resolve_session(&state, req.session_id).await?;

    let outcome = state.fees.assign_fees(req.class_id, session_id).await?;

    metrics::counter!("campus_fees_assigned_total").increment(outcome.written);
    record_op_duration("assign_fees", start, true);

    Ok(Json(ApiResponse::ok_with_message(
        outcome,
        format!("assigned {} fee records", outcome.written),
    )))
}

/// POST /api/v1/student-fees/collect-payment
///
/// Admins and accountants only. Overpayment is rejected with 422 and no
/// transaction is written.
#[instrument(
    skip(state, user, req),
    fields(student_fee_id = %req.student_fee_id, amount_cents = req.amount_cents)
)]
pub async fn collect_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CollectPaymentRequest>,
) -> ApiResult<Json<ApiResponse<PaymentReceiptView>>> {
    let start = Instant::now();

    if !user.can_collect_fees() {
        return Err(ApiError::Forbidden(
            "fee collection requires an admin or accountant role".into(),
        ));
    }

    let mode = req
        .payment_mode
        .parse::<PaymentMode>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let receipt = match state
        .fees
        .collect_payment(PaymentRequest {
            student_fee_id: req.student_fee_id,
            amount_cents: req.amount_cents,
            mode,
            reference_no: req.reference_no,
            collected_by: user.user_id,
        })
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => {
            record_op_duration("collect_payment", start, false);
            return Err(e.into());
        }
    };

    metrics::counter!("campus_payments_recorded_total", "mode" => mode.as_str()).increment(1);
    record_op_duration("collect_payment", start, true);

    Ok(Json(ApiResponse::ok_with_message(
        PaymentReceiptView::from(receipt),
        "payment recorded",
    )))
}
