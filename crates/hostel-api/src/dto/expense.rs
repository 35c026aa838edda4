use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hostel_core::domain::Expense;
use hostel_core::services::RecordExpenseCommand;
use hostel_shared::EntityId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordExpenseRequest {
    #[validate(range(min = 1))]
    pub hostel_id: Option<EntityId>,
    #[validate(range(min = 1))]
    pub semester_id: Option<EntityId>,
    pub amount: Decimal,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub expense_date: Option<NaiveDate>,
}

impl From<RecordExpenseRequest> for RecordExpenseCommand {
    fn from(req: RecordExpenseRequest) -> Self {
        RecordExpenseCommand {
            hostel_id: req.hostel_id,
            semester_id: req.semester_id,
            amount: req.amount,
            description: req.description,
            category: req.category,
            expense_date: req.expense_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDto {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub recorded_by: EntityId,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<Expense> for ExpenseDto {
    fn from(e: Expense) -> Self {
        Self {
            id: e.id,
            hostel_id: e.hostel_id,
            semester_id: e.semester_id,
            amount: e.amount,
            description: e.description,
            category: e.category,
            recorded_by: e.recorded_by,
            expense_date: e.expense_date,
            created_at: e.created_at,
        }
    }
}
