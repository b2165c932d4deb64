//! voicecheck - AI 合成语音检测服务
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Detection Context: 语言、音频格式、分类结论、置信度
//!
//! 应用层 (application/):
//! - Ports: VoiceClassifier、AudioStaging
//! - Services: RequestValidator、ClassificationGateway
//! - Commands: DetectVoice 命令处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: Gemini 客户端、Fake 分类器、临时文件暂存

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
