use axum::extract::{Path, State};

use hostel_shared::EntityId;

use super::{created, ok, ApiResult};
use crate::dto::{CheckInDto, CheckInRequest};
use crate::middleware::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /check-ins
pub async fn check_in(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<CheckInRequest>,
) -> ApiResult<CheckInDto> {
    let check_in = state
        .services
        .check_ins
        .check_in(&actor, payload.student_id, payload.hostel_id)
        .await?;
    created(check_in.into())
}

/// POST /check-ins/{id}/checkout
pub async fn check_out(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(check_in_id): Path<EntityId>,
) -> ApiResult<CheckInDto> {
    let check_in = state.services.check_ins.check_out(&actor, check_in_id).await?;
    ok(check_in.into())
}
