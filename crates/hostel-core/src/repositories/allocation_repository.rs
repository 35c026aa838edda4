//! Allocation repository trait (port)

use async_trait::async_trait;

use hostel_shared::EntityId;

use crate::domain::{Allocation, AllocationView, NewAllocation, ReportScope};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait AllocationRepository: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Allocation>, DomainError>;

    async fn find_for_student(
        &self,
        student_id: EntityId,
        semester_id: EntityId,
    ) -> Result<Option<Allocation>, DomainError>;

    /// Allocations held in `room_id` for the semester, not counting students
    /// whose check-in for that semester is closed.
    async fn count_occupied(&self, room_id: EntityId, semester_id: EntityId) -> Result<i64, DomainError>;

    /// Inserts the allocation after re-running
    /// [`admit_allocation`](crate::domain::admit_allocation) under a lock on the
    /// room, so concurrent requests cannot overfill it or double-allocate.
    async fn insert(&self, allocation: &NewAllocation, capacity: i32) -> Result<Allocation, DomainError>;

    /// Hard delete. Returns `false` when nothing was deleted.
    async fn delete(&self, id: EntityId) -> Result<bool, DomainError>;

    async fn list(&self, scope: &ReportScope) -> Result<Vec<AllocationView>, DomainError>;
}
