//! Check-in entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

/// Physical presence record, tracked independently of the allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: EntityId,
    pub student_id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub checked_in_at: DateTime<Utc>,
    pub checked_in_by: EntityId,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub checked_out_by: Option<EntityId>,
}

impl CheckIn {
    pub fn is_open(&self) -> bool {
        self.checked_out_at.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub student_id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub checked_in_by: EntityId,
}
