//! Voice Classifier Port - 外部语音分类模型抽象
//!
//! 外部模型被视为黑盒: 输入指令文本和音频，输出自由文本。
//! 具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use super::StagedAudio;

/// 分类器错误
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier is not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read staged audio: {0}")]
    AudioUnavailable(String),
}

/// Voice Classifier Port
///
/// 每次请求最多调用一次 `classify`，不做重试
#[async_trait]
pub trait VoiceClassifierPort: Send + Sync {
    /// 发送指令和音频到外部模型，返回模型的原始文本回答
    async fn classify(&self, instructions: &str, audio: &StagedAudio)
        -> Result<String, ClassifierError>;

    /// 检查外部模型是否可达
    async fn health_check(&self) -> bool {
        true
    }
}
