//! Semester entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSemester {
    pub hostel_id: EntityId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewSemester {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::ValidationError("Semester name is required".to_string()));
        }
        if self.end_date <= self.start_date {
            return Err(DomainError::ValidationError(
                "Semester end date must be after its start date".to_string(),
            ));
        }
        Ok(())
    }
}
