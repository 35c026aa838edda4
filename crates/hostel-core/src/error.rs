//! Domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use hostel_shared::EntityId;

/// Caller-facing classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Room not found: {0}")]
    RoomNotFound(EntityId),

    #[error("Student not found: {0}")]
    StudentNotFound(EntityId),

    #[error("Allocation not found: {0}")]
    AllocationNotFound(EntityId),

    #[error("Semester not found: {0}")]
    SemesterNotFound(EntityId),

    #[error("Hostel not found: {0}")]
    HostelNotFound(EntityId),

    #[error("Check-in not found: {0}")]
    CheckInNotFound(EntityId),

    #[error("{entity} belongs to a different hostel")]
    ScopeMismatch { entity: &'static str },

    #[error("Role {role} is not allowed to {action}")]
    MissingCapability { role: &'static str, action: &'static str },

    #[error("Student is already allocated to this room for the semester (idempotent: allocation {allocation_id} already exists)")]
    AlreadyAllocated { allocation_id: EntityId },

    #[error("Student already holds room {room_id} for the semester; check out allocation {allocation_id} first")]
    AllocatedToAnotherRoom { allocation_id: EntityId, room_id: EntityId },

    #[error("Room is full ({occupied}/{capacity} places taken)")]
    RoomFull { capacity: i32, occupied: i64 },

    #[error("Allocation is already fully paid")]
    AlreadyFullyPaid,

    #[error("Payment exceeds outstanding balance; maximum allowed is {max_allowed}")]
    ExceedsBalance { max_allowed: Decimal },

    #[error("Duplicate payment submission; payment {payment_id} was already recorded")]
    DuplicatePayment { payment_id: EntityId },

    #[error("Display price per student {display} is below the actual price per student {actual}")]
    DisplayPriceBelowCost { display: Decimal, actual: Decimal },

    #[error("Custodian price markup is not enabled for this hostel")]
    MarkupDisabled,

    #[error("Semester is already active")]
    SemesterAlreadyActive,

    #[error("No active semester for hostel {0}")]
    NoActiveSemester(EntityId),

    #[error("Student {registration_number} is already registered for this semester")]
    StudentAlreadyRegistered { registration_number: String },

    #[error("Student already has an open check-in for this semester")]
    AlreadyCheckedIn { check_in_id: EntityId },

    #[error("Check-in {0} is already closed")]
    AlreadyCheckedOut(EntityId),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound(_)
            | Self::StudentNotFound(_)
            | Self::AllocationNotFound(_)
            | Self::SemesterNotFound(_)
            | Self::HostelNotFound(_)
            | Self::CheckInNotFound(_) => ErrorKind::NotFound,

            Self::ScopeMismatch { .. } | Self::MissingCapability { .. } => ErrorKind::Forbidden,

            Self::AlreadyAllocated { .. }
            | Self::AllocatedToAnotherRoom { .. }
            | Self::DuplicatePayment { .. }
            | Self::SemesterAlreadyActive
            | Self::StudentAlreadyRegistered { .. }
            | Self::AlreadyCheckedIn { .. }
            | Self::AlreadyCheckedOut(_)
            | Self::Conflict(_) => ErrorKind::Conflict,

            Self::RoomFull { .. }
            | Self::AlreadyFullyPaid
            | Self::ExceedsBalance { .. }
            | Self::DisplayPriceBelowCost { .. }
            | Self::MarkupDisabled
            | Self::NoActiveSemester(_)
            | Self::ValidationError(_) => ErrorKind::Validation,

            Self::DatabaseError(_) | Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Id of the row a conflict refers to, surfaced to the caller.
    pub fn existing_id(&self) -> Option<EntityId> {
        match self {
            Self::AlreadyAllocated { allocation_id } => Some(*allocation_id),
            Self::AllocatedToAnotherRoom { allocation_id, .. } => Some(*allocation_id),
            Self::DuplicatePayment { payment_id } => Some(*payment_id),
            Self::AlreadyCheckedIn { check_in_id } => Some(*check_in_id),
            _ => None,
        }
    }

    /// Machine-readable code for API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::AllocationNotFound(_) => "ALLOCATION_NOT_FOUND",
            Self::SemesterNotFound(_) => "SEMESTER_NOT_FOUND",
            Self::HostelNotFound(_) => "HOSTEL_NOT_FOUND",
            Self::CheckInNotFound(_) => "CHECK_IN_NOT_FOUND",
            Self::ScopeMismatch { .. } => "SCOPE_MISMATCH",
            Self::MissingCapability { .. } => "FORBIDDEN",
            Self::AlreadyAllocated { .. } => "ALREADY_ALLOCATED",
            Self::AllocatedToAnotherRoom { .. } => "ALLOCATED_TO_ANOTHER_ROOM",
            Self::RoomFull { .. } => "ROOM_FULL",
            Self::AlreadyFullyPaid => "ALREADY_FULLY_PAID",
            Self::ExceedsBalance { .. } => "EXCEEDS_BALANCE",
            Self::DuplicatePayment { .. } => "DUPLICATE_PAYMENT",
            Self::DisplayPriceBelowCost { .. } => "DISPLAY_PRICE_BELOW_COST",
            Self::MarkupDisabled => "MARKUP_DISABLED",
            Self::SemesterAlreadyActive => "SEMESTER_ALREADY_ACTIVE",
            Self::NoActiveSemester(_) => "NO_ACTIVE_SEMESTER",
            Self::StudentAlreadyRegistered { .. } => "STUDENT_ALREADY_REGISTERED",
            Self::AlreadyCheckedIn { .. } => "ALREADY_CHECKED_IN",
            Self::AlreadyCheckedOut(_) => "ALREADY_CHECKED_OUT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::DatabaseError(_) | Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}
