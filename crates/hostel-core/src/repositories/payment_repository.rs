//! Payment repository trait (port)

use async_trait::async_trait;
use rust_decimal::Decimal;

use hostel_shared::EntityId;

use crate::domain::{Allocation, DuplicateProbe, LedgerState, NewPayment, Payment, PaymentView, ReportScope};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Current ledger facts for an allocation, including any duplicates the
    /// probe identifies.
    async fn ledger_state(&self, allocation: &Allocation, probe: &DuplicateProbe) -> Result<LedgerState, DomainError>;

    /// Appends a payment. Implementations lock the allocation, rebuild the
    /// [`LedgerState`] and re-run [`LedgerState::admit`] before inserting, so
    /// the ceiling holds under concurrent submissions.
    async fn append(
        &self,
        allocation: &Allocation,
        payment: &NewPayment,
        probe: &DuplicateProbe,
    ) -> Result<Payment, DomainError>;

    async fn total_paid(&self, allocation_id: EntityId) -> Result<Decimal, DomainError>;

    async fn list_for_allocation(&self, allocation_id: EntityId) -> Result<Vec<Payment>, DomainError>;

    async fn list(&self, scope: &ReportScope) -> Result<Vec<PaymentView>, DomainError>;
}
