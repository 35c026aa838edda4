use axum::extract::State;

use super::{created, ApiResult};
use crate::dto::{RegisterStudentRequest, StudentDto};
use crate::middleware::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /students
pub async fn register_student(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<RegisterStudentRequest>,
) -> ApiResult<StudentDto> {
    let student = state.services.students.register(&actor, payload.into()).await?;
    created(student.into())
}
