//! Semester-scoped finance reports. An unresolvable semester yields an empty
//! result rather than an error.

use axum::extract::{Query, State};

use hostel_core::domain::{AllocationView, FinanceStatistics, PaymentView};

use super::{ok, ApiResult};
use crate::dto::ScopeQuery;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// GET /payments/allocations
pub async fn list_allocations(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Vec<AllocationView>> {
    let rows = state
        .services
        .reporting
        .list_allocations(&actor, query.hostel_id, query.semester_id)
        .await?;
    ok(rows)
}

/// GET /payments
pub async fn list_payments(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Vec<PaymentView>> {
    let rows = state
        .services
        .reporting
        .list_payments(&actor, query.hostel_id, query.semester_id)
        .await?;
    ok(rows)
}

/// GET /payments/statistics
pub async fn finance_statistics(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<FinanceStatistics> {
    let stats = state
        .services
        .reporting
        .finance_statistics(&actor, query.hostel_id, query.semester_id)
        .await?;
    ok(stats)
}
