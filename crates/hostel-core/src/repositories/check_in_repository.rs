//! Check-in repository trait (port)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use hostel_shared::EntityId;

use crate::domain::{CheckIn, NewCheckIn};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait CheckInRepository: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<CheckIn>, DomainError>;
    async fn find_open(&self, student_id: EntityId, semester_id: EntityId) -> Result<Option<CheckIn>, DomainError>;
    /// Fails with a conflict when the student already has an open check-in.
    async fn create(&self, check_in: &NewCheckIn) -> Result<CheckIn, DomainError>;
    /// Closes an open check-in; a closed one yields a conflict.
    async fn close(&self, id: EntityId, closed_by: EntityId, at: DateTime<Utc>) -> Result<CheckIn, DomainError>;
}
