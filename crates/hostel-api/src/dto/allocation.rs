use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use hostel_core::domain::{Allocation, DispatchReport};
use hostel_core::services::{AllocateCommand, AllocationOutcome};
use hostel_shared::EntityId;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    #[validate(range(min = 1))]
    pub student_id: EntityId,
    #[validate(range(min = 1))]
    pub room_id: EntityId,
    #[validate(range(min = 1))]
    pub hostel_id: Option<EntityId>,
    /// Room-level price shown to the student; custodians only.
    pub display_price: Option<Decimal>,
}

impl From<AllocateRequest> for AllocateCommand {
    fn from(req: AllocateRequest) -> Self {
        AllocateCommand {
            student_id: req.student_id,
            room_id: req.room_id,
            hostel_id: req.hostel_id,
            display_price: req.display_price,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDto {
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

impl From<Allocation> for AllocationDto {
    fn from(a: Allocation) -> Self {
        Self {
            id: a.id,
            hostel_id: a.hostel_id,
            semester_id: a.semester_id,
            student_id: a.student_id,
            room_id: a.room_id,
            room_price_at_allocation: a.room_price_at_allocation,
            display_price_at_allocation: a.display_price_at_allocation,
            allocated_by: a.allocated_by,
            allocated_at: a.allocated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateResponse {
    pub allocation: AllocationDto,
    pub price_per_student: Decimal,
    pub display_price_per_student: Option<Decimal>,
    pub capacity: i32,
    pub notification: DispatchReport,
}

impl From<AllocationOutcome> for AllocateResponse {
    fn from(outcome: AllocationOutcome) -> Self {
        Self {
            price_per_student: outcome.pricing.actual,
            display_price_per_student: outcome.pricing.display,
            capacity: outcome.capacity,
            notification: outcome.notification,
            allocation: outcome.allocation.into(),
        }
    }
}
