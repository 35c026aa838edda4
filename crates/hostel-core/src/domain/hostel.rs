//! Hostel (tenant) entity and hostel-level feature switches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostel {
    pub id: EntityId,
    pub name: String,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Feature switches stored per hostel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostelFeature {
    CustodianPriceMarkup,
}

impl HostelFeature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustodianPriceMarkup => "custodian_price_markup",
        }
    }
}
