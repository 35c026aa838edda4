//! Room repository trait (port)

use async_trait::async_trait;

use hostel_shared::EntityId;

use crate::domain::Room;
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Room>, DomainError>;
}
