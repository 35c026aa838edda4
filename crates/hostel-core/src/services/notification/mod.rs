//! Best-effort student notifications
//!
//! Delivery outcomes are reported, never raised: nothing in this module can
//! fail an allocation or a payment.

mod dispatcher;
mod templates;

use async_trait::async_trait;

pub use dispatcher::NotificationDispatcher;
pub use templates::{AllocationNotice, MessageTemplates, PaymentNotice, RenderedMessage};

use crate::domain::DeliveryError;

/// Outbound email channel (port).
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/// Outbound SMS channel (port).
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, phone: &str, body: &str) -> Result<(), DeliveryError>;
}
