//! Semester repository trait (port)

use async_trait::async_trait;

use hostel_shared::EntityId;

use crate::domain::{NewSemester, Semester};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait SemesterRepository: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Semester>, DomainError>;
    async fn find_active(&self, hostel_id: EntityId) -> Result<Option<Semester>, DomainError>;
    async fn list(&self, hostel_id: Option<EntityId>) -> Result<Vec<Semester>, DomainError>;
    /// Semesters are created inactive.
    async fn create(&self, semester: &NewSemester) -> Result<Semester, DomainError>;
    /// Deactivates every other semester of the hostel and activates `id`, atomically.
    async fn activate(&self, id: EntityId) -> Result<Semester, DomainError>;
}
