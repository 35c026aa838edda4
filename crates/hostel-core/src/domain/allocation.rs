//! Allocation entity and admission rules
//!
//! One allocation binds one student to one room for one semester. Admission
//! is decided by [`admit_allocation`], which both the service pre-check and
//! the storage adapters evaluate so the rule lives in one place.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

use crate::domain::pricing::Pricing;
use crate::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub student_id: EntityId,
    pub room_id: EntityId,
    pub room_price_at_allocation: Decimal,
    pub display_price_at_allocation: Option<Decimal>,
    pub allocated_by: Option<EntityId>,
    pub allocated_at: DateTime<Utc>,
}

impl Allocation {
    pub fn pricing(&self) -> Pricing {
        Pricing {
            actual: self.room_price_at_allocation,
            display: self.display_price_at_allocation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAllocation {
    pub hostel_id: EntityId,
    pub semester_id: EntityId,
    pub student_id: EntityId,
    pub room_id: EntityId,
    pub pricing: Pricing,
    pub allocated_by: EntityId,
}

/// Places taken in a room for a semester, excluding students who have
/// formally checked out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomOccupancy {
    pub capacity: i32,
    pub occupied: i64,
}

impl RoomOccupancy {
    pub fn is_full(&self) -> bool {
        self.occupied >= i64::from(self.capacity)
    }
}

/// Decides whether a student may take a place in `room_id`.
///
/// A repeat request for the same room is reported as a conflict rather than
/// silently succeeding.
pub fn admit_allocation(
    existing: Option<&Allocation>,
    room_id: EntityId,
    occupancy: RoomOccupancy,
) -> Result<(), DomainError> {
    if let Some(existing) = existing {
        if existing.room_id == room_id {
            return Err(DomainError::AlreadyAllocated { allocation_id: existing.id });
        }
        return Err(DomainError::AllocatedToAnotherRoom {
            allocation_id: existing.id,
            room_id: existing.room_id,
        });
    }
    if occupancy.is_full() {
        return Err(DomainError::RoomFull {
            capacity: occupancy.capacity,
            occupied: occupancy.occupied,
        });
    }
    Ok(())
}
