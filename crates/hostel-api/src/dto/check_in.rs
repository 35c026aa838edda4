use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hostel_core::domain::CheckIn;
use hostel_shared::EntityId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[validate(range(min = 1))]
    pub student_id: EntityId,
    #[validate(range(min = 1))]
    pub hostel_id: Option<EntityId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInDto {
    pub id: EntityId,
    pub student_id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub checked_in_at: DateTime<Utc>,
    pub checked_in_by: EntityId,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub checked_out_by: Option<EntityId>,
}

impl From<CheckIn> for CheckInDto {
    fn from(c: CheckIn) -> Self {
        Self {
            id: c.id,
            student_id: c.student_id,
            hostel_id: c.hostel_id,
            semester_id: c.semester_id,
            checked_in_at: c.checked_in_at,
            checked_in_by: c.checked_in_by,
            checked_out_at: c.checked_out_at,
            checked_out_by: c.checked_out_by,
        }
    }
}
