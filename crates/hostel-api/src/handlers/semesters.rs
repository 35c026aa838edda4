use axum::extract::{Path, Query, State};

use hostel_shared::EntityId;

use super::{created, ok, ApiResult};
use crate::dto::{CreateSemesterRequest, HostelQuery, SemesterDto};
use crate::middleware::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /semesters
pub async fn create_semester(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateSemesterRequest>,
) -> ApiResult<SemesterDto> {
    let semester = state.services.semesters.create(&actor, payload.into()).await?;
    created(semester.into())
}

/// GET /semesters
pub async fn list_semesters(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<HostelQuery>,
) -> ApiResult<Vec<SemesterDto>> {
    let semesters = state.services.semesters.list(&actor, query.hostel_id).await?;
    ok(semesters.into_iter().map(SemesterDto::from).collect())
}

/// GET /semesters/active; `data` is null when no semester is active.
pub async fn active_semester(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<HostelQuery>,
) -> ApiResult<Option<SemesterDto>> {
    let semester = state.services.semesters.active(&actor, query.hostel_id).await?;
    ok(semester.map(SemesterDto::from))
}

/// POST /semesters/{id}/activate
pub async fn activate_semester(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(semester_id): Path<EntityId>,
) -> ApiResult<SemesterDto> {
    let semester = state.services.semesters.activate(&actor, semester_id).await?;
    ok(semester.into())
}
