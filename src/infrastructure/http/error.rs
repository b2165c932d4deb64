//! HTTP Error Handling
//!
//! 所有越过服务边界的错误统一渲染为 `{"status": "error", "message": ...}`

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 对外的通用 500 文案
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    Unprocessable(String),
    NotFound(String),
    MethodNotAllowed(String),
    PayloadTooLarge(String),
    /// 对外只给出 message，detail 只写日志
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            message: INTERNAL_ERROR_MESSAGE,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!(status = 401, error = %msg, "Unauthorized");
                (StatusCode::UNAUTHORIZED, msg)
            }
            ApiError::Unprocessable(msg) => {
                tracing::warn!(status = 422, error = %msg, "Validation failed");
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            ApiError::NotFound(msg) => {
                tracing::warn!(status = 404, error = %msg, "Resource not found");
                (StatusCode::NOT_FOUND, msg)
            }
            ApiError::MethodNotAllowed(msg) => {
                tracing::warn!(status = 405, error = %msg, "Method not allowed");
                (StatusCode::METHOD_NOT_ALLOWED, msg)
            }
            ApiError::PayloadTooLarge(msg) => {
                tracing::warn!(status = 413, error = %msg, "Payload too large");
                (StatusCode::PAYLOAD_TOO_LARGE, msg)
            }
            ApiError::Internal { message, detail } => {
                tracing::error!(status = 500, error = %detail, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Unauthorized => ApiError::Unauthorized("Invalid API key".to_string()),
            ApplicationError::UnsupportedLanguage(language) => {
                ApiError::Unprocessable(format!("Unsupported language: {}", language))
            }
            ApplicationError::UnsupportedFormat(_) => {
                ApiError::Unprocessable("Only MP3 supported".to_string())
            }
            ApplicationError::InvalidEncoding(_) => {
                ApiError::Unprocessable("Invalid Base64 audio".to_string())
            }
            ApplicationError::InvalidRequest(msg) => {
                ApiError::Unprocessable(format!("Invalid request body: {}", msg))
            }
            ApplicationError::ClassificationFailed(detail) => ApiError::Internal {
                message: "Voice classification failed",
                detail,
            },
            ApplicationError::StorageError(detail) => ApiError::internal(detail),
        }
    }
}

/// handler panic 时的兜底响应
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::internal(format!("handler panicked: {}", detail)).into_response()
}
