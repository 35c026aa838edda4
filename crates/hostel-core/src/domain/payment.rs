//! Payment entity and ledger admission rules
//!
//! Payments are append-only. For any allocation the sum of its payments never
//! exceeds `room_price_at_allocation`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hostel_shared::EntityId;

use super::pricing::max_money;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: EntityId,
    /// Not a foreign key: payments outlive the allocation they were made against.
    pub allocation_id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub student_id: EntityId,
    pub amount: Decimal,
    pub recorded_by: EntityId,
    pub recorded_at: DateTime<Utc>,
    pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub allocation_id: EntityId,
    pub amount: Decimal,
    pub recorded_by: EntityId,
    pub idempotency_key: Option<Uuid>,
}

/// Identifies earlier submissions that should be treated as the same payment.
#[derive(Debug, Clone)]
pub struct DuplicateProbe {
    pub allocation_id: EntityId,
    pub amount: Decimal,
    pub recorded_by: EntityId,
    pub idempotency_key: Option<Uuid>,
    /// When the submission arrived. Adapters store it as `recorded_at` so the
    /// window and the rows it is compared against share one clock.
    pub submitted_at: DateTime<Utc>,
    /// Start of the debounce window.
    pub since: DateTime<Utc>,
}

impl DuplicateProbe {
    pub fn for_payment(payment: &NewPayment, now: DateTime<Utc>, window: chrono::Duration) -> Self {
        Self {
            allocation_id: payment.allocation_id,
            amount: payment.amount,
            recorded_by: payment.recorded_by,
            idempotency_key: payment.idempotency_key,
            submitted_at: now,
            since: now - window,
        }
    }

    /// Whether `payment` falls inside this probe's debounce window.
    pub fn matches_recent(&self, payment: &Payment) -> bool {
        payment.allocation_id == self.allocation_id
            && payment.amount == self.amount
            && payment.recorded_by == self.recorded_by
            && payment.recorded_at >= self.since
    }

    pub fn matches_key(&self, payment: &Payment) -> bool {
        match self.idempotency_key {
            Some(key) => payment.allocation_id == self.allocation_id && payment.idempotency_key == Some(key),
            None => false,
        }
    }
}

/// Ledger facts for one allocation at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    pub price: Decimal,
    pub total_paid: Decimal,
    /// Payment already recorded under the caller's idempotency key.
    pub keyed_duplicate: Option<EntityId>,
    /// Identical payment recorded inside the debounce window.
    pub recent_duplicate: Option<EntityId>,
}

impl LedgerState {
    pub fn balance(&self) -> Decimal {
        self.price - self.total_paid
    }

    /// Checks run in a fixed order: idempotency key, fully paid, ceiling,
    /// then the debounce window. A balance rejection caused by an identical
    /// submission inside the window is reported as that duplicate instead.
    pub fn admit(&self, amount: Decimal) -> Result<(), DomainError> {
        validate_amount(amount)?;
        if let Some(payment_id) = self.keyed_duplicate {
            return Err(DomainError::DuplicatePayment { payment_id });
        }
        self.check_balance(amount).map_err(|e| match self.recent_duplicate {
            Some(payment_id) => DomainError::DuplicatePayment { payment_id },
            None => e,
        })?;
        if let Some(payment_id) = self.recent_duplicate {
            return Err(DomainError::DuplicatePayment { payment_id });
        }
        Ok(())
    }

    fn check_balance(&self, amount: Decimal) -> Result<(), DomainError> {
        let balance = self.balance();
        if balance <= Decimal::ZERO {
            return Err(DomainError::AlreadyFullyPaid);
        }
        if amount > balance {
            return Err(DomainError::ExceedsBalance { max_allowed: balance });
        }
        Ok(())
    }
}

/// Payment amounts are positive with at most two decimal places.
pub fn validate_amount(amount: Decimal) -> Result<(), DomainError> {
    if amount < Decimal::new(1, 2) {
        return Err(DomainError::ValidationError("Amount must be at least 0.01".to_string()));
    }
    if amount > max_money() {
        return Err(DomainError::ValidationError(format!("Amount cannot exceed {}", max_money())));
    }
    if amount.normalize().scale() > hostel_shared::constants::MONEY_SCALE {
        return Err(DomainError::ValidationError(
            "Amount must have at most two decimal places".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    pub fn from_totals(price: Decimal, total_paid: Decimal) -> Self {
        if total_paid >= price {
            Self::Paid
        } else if total_paid > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Unpaid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Unpaid => "unpaid",
        }
    }
}

/// Price, paid, and outstanding amounts for one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub price: Decimal,
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: PaymentStatus,
}

impl BalanceSnapshot {
    pub fn new(price: Decimal, total_paid: Decimal) -> Self {
        Self {
            price,
            total_paid,
            balance: price - total_paid,
            status: PaymentStatus::from_totals(price, total_paid),
        }
    }
}
