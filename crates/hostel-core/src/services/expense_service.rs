//! Hostel expenses, always tied to a semester

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use hostel_shared::EntityId;

use super::support::{resolve_report_scope, resolve_write_semester};
use crate::domain::{Actor, AuditAction, AuditEntry, Capability, Expense, ExpenseSummary, NewExpense};
use crate::error::DomainError;
use crate::repositories::{AuditRecorder, Repositories};

#[derive(Debug, Clone)]
pub struct RecordExpenseCommand {
    pub hostel_id: Option<EntityId>,
    pub semester_id: Option<EntityId>,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    /// Defaults to today.
    pub expense_date: Option<NaiveDate>,
}

pub struct ExpenseService {
    repos: Repositories,
    audit: Arc<dyn AuditRecorder>,
}

impl ExpenseService {
    pub fn new(repos: Repositories, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { repos, audit }
    }

    pub async fn record(&self, actor: &Actor, cmd: RecordExpenseCommand) -> Result<Expense, DomainError> {
        actor.require(Capability::ManageExpenses)?;
        let hostel_id = actor.require_hostel(cmd.hostel_id)?;
        let semester = resolve_write_semester(self.repos.semesters.as_ref(), hostel_id, cmd.semester_id).await?;

        let new_expense = NewExpense {
            hostel_id,
            semester_id: semester.id,
            amount: cmd.amount,
            description: cmd.description.trim().to_string(),
            category: cmd.category.trim().to_lowercase(),
            recorded_by: actor.user_id,
            expense_date: cmd.expense_date.unwrap_or_else(|| Utc::now().date_naive()),
        };
        new_expense.validate()?;

        let expense = self.repos.expenses.create(&new_expense).await?;
        info!(
            "Expense {} of {} ({}) recorded for hostel {}",
            expense.id, expense.amount, expense.category, hostel_id
        );

        self.audit.record(
            AuditEntry::new(AuditAction::ExpenseRecorded, actor.user_id, "expense", expense.id)
                .hostel(hostel_id)
                .details(json!({
                    "amount": expense.amount,
                    "category": expense.category,
                    "semesterId": expense.semester_id,
                })),
        );
        Ok(expense)
    }

    /// Empty when no semester can be resolved.
    pub async fn list(
        &self,
        actor: &Actor,
        hostel_id: Option<EntityId>,
        semester_id: Option<EntityId>,
    ) -> Result<Vec<Expense>, DomainError> {
        actor.require(Capability::ManageExpenses)?;
        match resolve_report_scope(self.repos.semesters.as_ref(), actor, hostel_id, semester_id).await? {
            Some(scope) => self.repos.expenses.list(&scope).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn summary(
        &self,
        actor: &Actor,
        hostel_id: Option<EntityId>,
        semester_id: Option<EntityId>,
    ) -> Result<ExpenseSummary, DomainError> {
        actor.require(Capability::ManageExpenses)?;
        match resolve_report_scope(self.repos.semesters.as_ref(), actor, hostel_id, semester_id).await? {
            Some(scope) => self.repos.expenses.summary(&scope).await,
            None => Ok(ExpenseSummary::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Role};
    use crate::testing::TestContext;
    use rust_decimal_macros::dec;

    fn expense(amount: Decimal, category: &str) -> RecordExpenseCommand {
        RecordExpenseCommand {
            hostel_id: None,
            semester_id: None,
            amount,
            description: "Monthly bill".to_string(),
            category: category.to_string(),
            expense_date: None,
        }
    }

    #[tokio::test]
    async fn summary_groups_by_category() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let actor = ctx.custodian(hostel.id);

        ctx.services.expenses.record(&actor, expense(dec!(20000), "Water")).await.unwrap();
        ctx.services.expenses.record(&actor, expense(dec!(5000.50), "water")).await.unwrap();
        ctx.services.expenses.record(&actor, expense(dec!(45000), "Power")).await.unwrap();

        let summary = ctx.services.expenses.summary(&actor, None, None).await.unwrap();
        assert_eq!(summary.semester_id, Some(semester.id));
        assert_eq!(summary.total, dec!(70000.50));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.by_category.len(), 2);
        let water = summary.by_category.iter().find(|c| c.category == "water").unwrap();
        assert_eq!(water.total, dec!(25000.50));
        assert_eq!(water.count, 2);

        assert_eq!(ctx.services.expenses.list(&actor, None, None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn no_active_semester_means_empty_not_error() {
        let ctx = TestContext::new();
        let hostel = ctx.store.seed_hostel("Quiet");
        let actor = ctx.custodian(hostel.id);

        assert!(ctx.services.expenses.list(&actor, None, None).await.unwrap().is_empty());
        let summary = ctx.services.expenses.summary(&actor, None, None).await.unwrap();
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.count, 0);

        let admin = Actor::new(1, Role::SuperAdmin, None);
        assert!(ctx.services.expenses.list(&admin, None, None).await.unwrap().is_empty());

        let err = ctx
            .services
            .expenses
            .record(&actor, expense(dec!(100), "misc"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let ctx = TestContext::new();
        let (hostel, _) = ctx.hostel_with_active_semester("Mlimani");

        let err = ctx
            .services
            .expenses
            .record(&ctx.custodian(hostel.id), expense(dec!(0), "misc"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
