//! Detection Commands

/// 检测请求要素（来自请求体）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRequest {
    pub language: String,
    pub audio_format: String,
    pub audio_base64: String,
}

/// 语音检测命令
#[derive(Debug, Clone)]
pub struct DetectVoice {
    /// 请求头携带的凭证
    pub api_key: Option<String>,
    pub request: DetectionRequest,
}
