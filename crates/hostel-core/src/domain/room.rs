//! Room entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

/// A room's price is mutable; allocations snapshot the per-student share so
/// later edits never reach existing allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: EntityId,
    pub hostel_id: EntityId,
    pub name: String,
    pub price: Decimal,
    pub capacity: i32,
    pub is_active: bool,
}
