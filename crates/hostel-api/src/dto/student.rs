use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use hostel_core::domain::Student;
use hostel_core::services::RegisterStudentCommand;
use hostel_shared::EntityId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentRequest {
    #[validate(range(min = 1))]
    pub hostel_id: Option<EntityId>,
    #[validate(range(min = 1))]
    pub semester_id: Option<EntityId>,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 100))]
    pub registration_number: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
}

impl From<RegisterStudentRequest> for RegisterStudentCommand {
    fn from(req: RegisterStudentRequest) -> Self {
        RegisterStudentCommand {
            hostel_id: req.hostel_id,
            semester_id: req.semester_id,
            full_name: req.full_name,
            registration_number: req.registration_number,
            phone: req.phone,
            email: req.email,
            gender: req.gender,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDto {
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

impl From<Student> for StudentDto {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            hostel_id: s.hostel_id,
            semester_id: s.semester_id,
            full_name: s.full_name,
            registration_number: s.registration_number,
            phone: s.phone,
            email: s.email,
            gender: s.gender,
            created_at: s.created_at,
        }
    }
}
