//! Notification requests, delivery outcomes, and message history

use serde::Serialize;
use thiserror::Error;

use hostel_shared::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    AllocationConfirmation,
    PaymentReceipt,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllocationConfirmation => "ALLOCATION_CONFIRMATION",
            Self::PaymentReceipt => "PAYMENT_RECEIPT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rejected by provider: {0}")]
    Rejected(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// A rendered message and the channels it may go out on.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub student_id: EntityId,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message_type: MessageType,
    pub subject: String,
    pub body: String,
}

/// One row of the message-history store.
#[derive(Debug, Clone)]
pub struct NewMessageHistory {
    pub student_id: EntityId,
    pub channel: Channel,
    pub message_type: MessageType,
    pub recipient: String,
    pub content: String,
    pub status: MessageStatus,
    pub error: Option<String>,
}

/// What happened to a notification. Never an error from the caller's view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub email_sent: bool,
    pub sms_sent: bool,
    pub history_ids: Vec<EntityId>,
}
