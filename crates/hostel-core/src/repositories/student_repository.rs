//! Student repository trait (port)

use async_trait::async_trait;

use hostel_shared::EntityId;

use crate::domain::{NewStudent, Student};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Student>, DomainError>;
    async fn find_by_registration(
        &self,
        registration_number: &str,
        semester_id: EntityId,
    ) -> Result<Option<Student>, DomainError>;
    /// Fails with a conflict when `(registration_number, semester_id)` is taken.
    async fn create(&self, student: &NewStudent) -> Result<Student, DomainError>;
}
