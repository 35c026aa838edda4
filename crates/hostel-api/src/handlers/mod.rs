//! HTTP handlers

pub mod allocations;
pub mod check_ins;
pub mod expenses;
pub mod health;
pub mod payments;
pub mod reports;
pub mod semesters;
pub mod students;

use axum::{http::StatusCode, Json};

use crate::error::ApiError;
use crate::response::ApiResponse;

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn ok<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

pub(crate) fn created<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}
