// ============================================================================
// Hostel API - Allocation Handlers
// File: crates/hostel-api/src/handlers/allocations.rs
// ============================================================================
//! Room allocation and administrative checkout

use axum::extract::{Path, Query, State};

use hostel_shared::EntityId;

use super::{created, ok, ApiResult};
use crate::dto::{AllocateRequest, AllocateResponse, AllocationDto, HostelQuery};
use crate::middleware::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /payments/allocate
pub async fn allocate(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<AllocateRequest>,
) -> ApiResult<AllocateResponse> {
    let outcome = state.services.allocations.allocate(&actor, payload.into()).await?;
    created(outcome.into())
}

/// DELETE /payments/allocations/{id}
pub async fn checkout(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(allocation_id): Path<EntityId>,
    Query(query): Query<HostelQuery>,
) -> ApiResult<AllocationDto> {
    let allocation = state
        .services
        .allocations
        .checkout(&actor, allocation_id, query.hostel_id)
        .await?;
    ok(allocation.into())
}
