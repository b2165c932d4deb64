//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（VoiceClassifier、AudioStaging）
//! - services: 请求校验与分类网关
//! - commands: 检测命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod services;

// Re-exports
pub use commands::{handlers::DetectVoiceHandler, DetectVoice, DetectionRequest};

pub use error::ApplicationError;

pub use ports::{
    AudioStagingPort, ClassifierError, StagedAudio, StagingError, VoiceClassifierPort,
};

pub use services::{ClassificationGateway, FailurePolicy, RequestValidator};
