//! Expense entity

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

use crate::domain::payment::validate_amount;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
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

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub recorded_by: EntityId,
    pub expense_date: NaiveDate,
}

impl NewExpense {
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_amount(self.amount)?;
        if self.description.trim().is_empty() {
            return Err(DomainError::ValidationError("Description is required".to_string()));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::ValidationError("Category is required".to_string()));
        }
        Ok(())
    }
}
