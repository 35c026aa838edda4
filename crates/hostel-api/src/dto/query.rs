use serde::Deserialize;

use hostel_shared::EntityId;

/// `?hostelId=&semesterId=` filter used by the report endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub hostel_id: Option<EntityId>,
    pub semester_id: Option<EntityId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelQuery {
    pub hostel_id: Option<EntityId>,
}
