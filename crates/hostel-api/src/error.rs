//! Mapping of failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use hostel_core::{DomainError, ErrorKind};
use hostel_security::JwtError;

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),
}

impl From<JwtError> for ApiError {
    fn from(e: JwtError) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthorized(reason) => {
                warn!("Rejected request: {}", reason);
                (
                    StatusCode::UNAUTHORIZED,
                    ApiResponse::<()>::error("UNAUTHORIZED", "Authentication required", None),
                )
            }
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ApiResponse::<()>::error("VALIDATION_ERROR", message, None),
            ),
            ApiError::Domain(e) => {
                let status = match e.kind() {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                    ErrorKind::Conflict => StatusCode::CONFLICT,
                    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!("Request failed: {}", e);
                    (
                        status,
                        ApiResponse::<()>::error(e.code(), "An internal error occurred", None),
                    )
                } else {
                    (status, ApiResponse::<()>::error(e.code(), &e.to_string(), e.existing_id()))
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_carries_existing_id() {
        let (status, body) = render(DomainError::AlreadyAllocated { allocation_id: 7 }.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "ALREADY_ALLOCATED");
        assert_eq!(body["error"]["existingId"], 7);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = render(DomainError::DatabaseError("relation payments does not exist".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(!message.contains("payments"));
        assert!(body["error"].get("existingId").is_none());
    }

    #[tokio::test]
    async fn kinds_map_to_status_codes() {
        let cases = [
            (DomainError::RoomFull { capacity: 2, occupied: 2 }, StatusCode::BAD_REQUEST),
            (DomainError::RoomNotFound(1), StatusCode::NOT_FOUND),
            (DomainError::ScopeMismatch { entity: "Room" }, StatusCode::FORBIDDEN),
            (DomainError::SemesterAlreadyActive, StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            let (status, _) = render(err.into()).await;
            assert_eq!(status, expected);
        }
        let (status, _) = render(ApiError::Unauthorized("missing token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
