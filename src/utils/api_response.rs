// Uniform JSON envelope: {success, message, data}

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// Error body; `data` is always null
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub message: String,
    pub data: Option<()>,
    pub code: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl ApiErrorBody {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            code: code.to_string(),
        }
    }
}

/// 200 with envelope
pub fn ok<T: Serialize>(data: T, message: &str) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok(data, message)))
}

/// 201 with envelope
pub fn created<T: Serialize>(data: T, message: &str) -> impl IntoResponse {
    (StatusCode::CREATED, Json(ApiResponse::ok(data, message)))
}
