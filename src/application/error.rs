//! 应用层错误定义
//!
//! 统一的检测用例错误类型

use thiserror::Error;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 凭证缺失或不匹配
    #[error("Invalid API key")]
    Unauthorized,

    /// 不支持的语言
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// 不支持的音频格式
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// 音频载荷不是合法的 base64
    #[error("Invalid Base64 audio: {0}")]
    InvalidEncoding(String),

    /// 请求体结构错误
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),

    /// 外部分类失败（仅 strict 策略下向上报告）
    #[error("Classification failed: {0}")]
    ClassificationFailed(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl ApplicationError {
    /// 创建分类失败错误
    pub fn classification_failed(message: impl Into<String>) -> Self {
        Self::ClassificationFailed(message.into())
    }
}

impl From<crate::application::ports::StagingError> for ApplicationError {
    fn from(err: crate::application::ports::StagingError) -> Self {
        Self::StorageError(err.to_string())
    }
}
