//! Audit trail entries

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use hostel_shared::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RoomAllocated,
    StudentCheckedOut,
    PaymentRecorded,
    SemesterCreated,
    SemesterActivated,
    StudentRegistered,
    StudentCheckedIn,
    CheckInClosed,
    ExpenseRecorded,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomAllocated => "ROOM_ALLOCATED",
            Self::StudentCheckedOut => "STUDENT_CHECKED_OUT",
            Self::PaymentRecorded => "PAYMENT_RECORDED",
            Self::SemesterCreated => "SEMESTER_CREATED",
            Self::SemesterActivated => "SEMESTER_ACTIVATED",
            Self::StudentRegistered => "STUDENT_REGISTERED",
            Self::StudentCheckedIn => "STUDENT_CHECKED_IN",
            Self::CheckInClosed => "CHECK_IN_CLOSED",
            Self::ExpenseRecorded => "EXPENSE_RECORDED",
        }
    }
}

/// Append-only record of a state-changing action.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub actor_user_id: EntityId,
    pub hostel_id: Option<EntityId>,
    pub entity_type: &'static str,
    pub entity_id: EntityId,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, actor_user_id: EntityId, entity_type: &'static str, entity_id: EntityId) -> Self {
        Self {
            action,
            actor_user_id,
            hostel_id: None,
            entity_type,
            entity_id,
            details: Value::Null,
            created_at: Utc::now(),
        }
    }

    pub fn hostel(mut self, hostel_id: EntityId) -> Self {
        self.hostel_id = Some(hostel_id);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}
