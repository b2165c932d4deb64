//! Application State
//!
//! 启动时构造一次，之后只读，所有请求共享

use std::sync::Arc;

use crate::application::{
    AudioStagingPort, ClassificationGateway, DetectVoiceHandler, RequestValidator,
};

/// 应用状态
pub struct AppState {
    // ========== Services ==========
    pub validator: Arc<RequestValidator>,

    // ========== Command Handlers ==========
    pub detect_voice_handler: DetectVoiceHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        validator: Arc<RequestValidator>,
        staging: Arc<dyn AudioStagingPort>,
        gateway: Arc<ClassificationGateway>,
    ) -> Self {
        Self {
            validator: validator.clone(),
            detect_voice_handler: DetectVoiceHandler::new(validator, staging, gateway),
        }
    }
}
