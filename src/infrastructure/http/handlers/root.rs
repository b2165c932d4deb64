//! Root Handler
//!
//! 存活探测 + 服务信息，无需鉴权

use axum::Json;

use crate::infrastructure::http::dto::RootResponse;
use crate::infrastructure::http::error::ApiError;

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Voice Detection API running",
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

/// 未知路由
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// 路由存在但方法不对
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed("Method not allowed".to_string())
}
