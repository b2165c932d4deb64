//! HTTP Routes
//!
//! API Endpoints:
//! - /                      GET   服务信息（存活探测，无需鉴权）
//! - /api/voice-detection   POST  语音真伪检测（x-api-key 鉴权）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root).fallback(handlers::method_not_allowed))
        .nest("/api", api_routes())
        .fallback(handlers::not_found)
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/voice-detection",
        post(handlers::detect_voice).fallback(handlers::method_not_allowed),
    )
}
