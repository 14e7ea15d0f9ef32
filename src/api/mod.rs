//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod events;
mod uploads;
mod weather;

pub use events::*;
pub use uploads::*;
pub use weather::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a 201 response for a newly stored resource.
pub fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse {
        status: StatusCode::CREATED,
        ..ApiResponse::new(data)
    })
}
