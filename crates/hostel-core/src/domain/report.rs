//! Read models for the reporting endpoints

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use hostel_shared::EntityId;

use crate::domain::payment::PaymentStatus;

/// Hostel and semester a report is restricted to. The semester is always
/// known; `hostel_id` is `None` only for cross-tenant callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportScope {
    pub hostel_id: Option<EntityId>,
    pub semester_id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationView {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub student_id: EntityId,
    pub student_name: String,
    pub registration_number: String,
    pub room_id: EntityId,
    pub room_name: String,
    pub price_per_student: Decimal,
    pub display_price: Option<Decimal>,
    pub total_paid: Decimal,
    pub balance: Decimal,
    pub status: PaymentStatus,
    pub allocated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub id: EntityId,
    pub allocation_id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub student_id: EntityId,
    pub student_name: Option<String>,
    pub room_name: Option<String>,
    pub amount: Decimal,
    pub recorded_by: EntityId,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub semester_id: Option<EntityId>,
    pub total: Decimal,
    pub count: i64,
    pub by_category: Vec<CategoryTotal>,
}

impl ExpenseSummary {
    pub fn empty() -> Self {
        Self {
            semester_id: None,
            total: Decimal::ZERO,
            count: 0,
            by_category: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceStatistics {
    pub semester_id: Option<EntityId>,
    pub allocations: i64,
    pub fully_paid: i64,
    pub expected_revenue: Decimal,
    pub collected: Decimal,
    pub outstanding: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

impl FinanceStatistics {
    pub fn empty() -> Self {
        Self {
            semester_id: None,
            allocations: 0,
            fully_paid: 0,
            expected_revenue: Decimal::ZERO,
            collected: Decimal::ZERO,
            outstanding: Decimal::ZERO,
            expenses: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }
}
