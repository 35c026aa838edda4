use axum::extract::{Query, State};

use hostel_core::domain::ExpenseSummary;

use super::{created, ok, ApiResult};
use crate::dto::{ExpenseDto, RecordExpenseRequest, ScopeQuery};
use crate::middleware::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /expenses
pub async fn record_expense(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<RecordExpenseRequest>,
) -> ApiResult<ExpenseDto> {
    let expense = state.services.expenses.record(&actor, payload.into()).await?;
    created(expense.into())
}

/// GET /expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Vec<ExpenseDto>> {
    let expenses = state
        .services
        .expenses
        .list(&actor, query.hostel_id, query.semester_id)
        .await?;
    ok(expenses.into_iter().map(ExpenseDto::from).collect())
}

/// GET /expenses/summary
pub async fn expense_summary(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<ExpenseSummary> {
    let summary = state
        .services
        .expenses
        .summary(&actor, query.hostel_id, query.semester_id)
        .await?;
    ok(summary)
}
