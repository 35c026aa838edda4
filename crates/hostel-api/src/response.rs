//! API Response wrapper

use chrono::Utc;
use serde::Serialize;

use hostel_shared::EntityId;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    /// Row a conflict refers to, e.g. the allocation a repeat request hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<EntityId>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: &str, message: &str, existing_id: Option<EntityId>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
                existing_id,
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
