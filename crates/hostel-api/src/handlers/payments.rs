// ============================================================================
// Hostel API - Payment Handlers
// File: crates/hostel-api/src/handlers/payments.rs
// ============================================================================

use axum::extract::{Path, State};

use hostel_core::services::RecordPaymentCommand;
use hostel_shared::EntityId;

use super::{created, ok, ApiResult};
use crate::dto::{PaymentSummaryResponse, RecordPaymentRequest, RecordPaymentResponse};
use crate::middleware::{AuthUser, IdempotencyKey, ValidatedJson};
use crate::state::AppState;

/// POST /payments
pub async fn record_payment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    IdempotencyKey(header_key): IdempotencyKey,
    ValidatedJson(payload): ValidatedJson<RecordPaymentRequest>,
) -> ApiResult<RecordPaymentResponse> {
    let cmd = RecordPaymentCommand {
        allocation_id: payload.allocation_id,
        amount: payload.amount,
        idempotency_key: header_key.or(payload.idempotency_key),
    };
    let outcome = state.services.payments.record_payment(&actor, cmd).await?;
    created(outcome.into())
}

/// GET /payments/summary/{allocation_id}
pub async fn payment_summary(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(allocation_id): Path<EntityId>,
) -> ApiResult<PaymentSummaryResponse> {
    let summary = state.services.payments.payment_summary(&actor, allocation_id).await?;
    ok(summary.into())
}
