use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hostel_core::domain::Semester;
use hostel_core::services::CreateSemesterCommand;
use hostel_shared::EntityId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSemesterRequest {
    #[validate(range(min = 1))]
    pub hostel_id: Option<EntityId>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<CreateSemesterRequest> for CreateSemesterCommand {
    fn from(req: CreateSemesterRequest) -> Self {
        CreateSemesterCommand {
            hostel_id: req.hostel_id,
            name: req.name,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterDto {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Semester> for SemesterDto {
    fn from(s: Semester) -> Self {
        Self {
            id: s.id,
            hostel_id: s.hostel_id,
            name: s.name,
            start_date: s.start_date,
            end_date: s.end_date,
            is_active: s.is_active,
            created_at: s.created_at,
        }
    }
}
