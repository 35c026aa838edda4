//! Hostel repository trait (port)

use async_trait::async_trait;

use hostel_shared::EntityId;

use crate::domain::{Hostel, HostelFeature};
use crate::error::DomainError;

#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait HostelRepository: Send + Sync {
    async fn find_by_id(&self, id: EntityId) -> Result<Option<Hostel>, DomainError>;
    async fn feature_enabled(&self, hostel_id: EntityId, feature: HostelFeature) -> Result<bool, DomainError>;
}
