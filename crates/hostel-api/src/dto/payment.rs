use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use hostel_core::domain::{BalanceSnapshot, DispatchReport, Payment};
use hostel_core::services::{DisplayAmounts, PaymentOutcome, PaymentSummary};
use hostel_shared::EntityId;

use super::AllocationDto;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentRequest {
    #[validate(range(min = 1))]
    pub allocation_id: EntityId,
    pub amount: Decimal,
    /// Same role as the `Idempotency-Key` header; the header wins.
    pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDto {
    pub id: EntityId,
    pub allocation_id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub student_id: EntityId,
    pub amount: Decimal,
    pub recorded_by: EntityId,
    pub recorded_at: DateTime<Utc>,
    pub idempotency_key: Option<Uuid>,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            allocation_id: p.allocation_id,
            hostel_id: p.hostel_id,
            semester_id: p.semester_id,
            student_id: p.student_id,
            amount: p.amount,
            recorded_by: p.recorded_by,
            recorded_at: p.recorded_at,
            idempotency_key: p.idempotency_key,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentResponse {
    pub payment: PaymentDto,
    pub balance: BalanceSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayAmounts>,
    pub notification: DispatchReport,
}

impl From<PaymentOutcome> for RecordPaymentResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            payment: outcome.payment.into(),
            balance: outcome.balance,
            display: outcome.display,
            notification: outcome.notification,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummaryResponse {
    pub allocation: AllocationDto,
    pub balance: BalanceSnapshot,
    pub payments: Vec<PaymentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayAmounts>,
}

impl From<PaymentSummary> for PaymentSummaryResponse {
    fn from(summary: PaymentSummary) -> Self {
        Self {
            allocation: summary.allocation.into(),
            balance: summary.balance,
            payments: summary.payments.into_iter().map(PaymentDto::from).collect(),
            display: summary.display,
        }
    }
}
