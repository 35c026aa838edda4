//! Read-only finance reports
//!
//! Every query runs inside one semester. When no semester can be resolved the
//! report is empty.

use rust_decimal::Decimal;

use hostel_shared::EntityId;

use super::support::resolve_report_scope;
use crate::domain::{Actor, AllocationView, Capability, FinanceStatistics, PaymentStatus, PaymentView, ReportScope};
use crate::error::DomainError;
use crate::repositories::Repositories;

pub struct ReportingService {
    repos: Repositories,
}

impl ReportingService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list_allocations(
        &self,
        actor: &Actor,
        hostel_id: Option<EntityId>,
        semester_id: Option<EntityId>,
    ) -> Result<Vec<AllocationView>, DomainError> {
        match self.scope(actor, hostel_id, semester_id).await? {
            Some(scope) => self.repos.allocations.list(&scope).await,
            None => Ok(Vec::new()),
        }
    }

    /// Includes payments whose allocation has since been checked out.
    pub async fn list_payments(
        &self,
        actor: &Actor,
        hostel_id: Option<EntityId>,
        semester_id: Option<EntityId>,
    ) -> Result<Vec<PaymentView>, DomainError> {
        match self.scope(actor, hostel_id, semester_id).await? {
            Some(scope) => self.repos.payments.list(&scope).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn finance_statistics(
        &self,
        actor: &Actor,
        hostel_id: Option<EntityId>,
        semester_id: Option<EntityId>,
    ) -> Result<FinanceStatistics, DomainError> {
        let Some(scope) = self.scope(actor, hostel_id, semester_id).await? else {
            return Ok(FinanceStatistics::empty());
        };

        let allocations = self.repos.allocations.list(&scope).await?;
        let payments = self.repos.payments.list(&scope).await?;
        let expenses = self.repos.expenses.summary(&scope).await?;

        let expected_revenue: Decimal = allocations.iter().map(|a| a.price_per_student).sum();
        let outstanding: Decimal = allocations.iter().map(|a| a.balance.max(Decimal::ZERO)).sum();
        let collected: Decimal = payments.iter().map(|p| p.amount).sum();

        Ok(FinanceStatistics {
            semester_id: Some(scope.semester_id),
            allocations: allocations.len() as i64,
            fully_paid: allocations.iter().filter(|a| a.status == PaymentStatus::Paid).count() as i64,
            expected_revenue,
            collected,
            outstanding,
            expenses: expenses.total,
            net: collected - expenses.total,
        })
    }

    async fn scope(
        &self,
        actor: &Actor,
        hostel_id: Option<EntityId>,
        semester_id: Option<EntityId>,
    ) -> Result<Option<ReportScope>, DomainError> {
        actor.require(Capability::ViewFinance)?;
        resolve_report_scope(self.repos.semesters.as_ref(), actor, hostel_id, semester_id).await
    }
}
