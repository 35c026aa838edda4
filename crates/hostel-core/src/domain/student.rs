//! Student entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: Option<EntityId>,
    pub full_name: String,
    pub registration_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub full_name: String,
    pub registration_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
}

impl NewStudent {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::ValidationError("Full name is required".to_string()));
        }
        if self.registration_number.trim().is_empty() {
            return Err(DomainError::ValidationError("Registration number is required".to_string()));
        }
        Ok(())
    }
}
