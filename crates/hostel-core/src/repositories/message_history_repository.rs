//! Message history repository trait (port)

use async_trait::async_trait;

use hostel_shared::EntityId;

use crate::domain::NewMessageHistory;
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait MessageHistoryRepository: Send + Sync {
    async fn record(&self, entry: &NewMessageHistory) -> Result<EntityId, DomainError>;
}
