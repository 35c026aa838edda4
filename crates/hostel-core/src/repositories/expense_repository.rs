//! Expense repository trait (port)

use async_trait::async_trait;

use crate::domain::{Expense, ExpenseSummary, NewExpense, ReportScope};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn create(&self, expense: &NewExpense) -> Result<Expense, DomainError>;
    async fn list(&self, scope: &ReportScope) -> Result<Vec<Expense>, DomainError>;
    async fn summary(&self, scope: &ReportScope) -> Result<ExpenseSummary, DomainError>;
}
