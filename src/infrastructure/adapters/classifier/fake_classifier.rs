//! Fake Classifier - 用于本地联调和测试的分类器
//!
//! 始终返回配置的固定文本，不实际调用外部模型

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{ClassifierError, StagedAudio, VoiceClassifierPort};

/// 默认返回的固定回答
pub const DEFAULT_FAKE_RESPONSE: &str = r#"{"status":"success","language":"English","classification":"HUMAN","confidenceScore":0.8,"explanation":"Natural pitch variation and breathing detected"}"#;

/// Fake Classifier 配置
#[derive(Debug, Clone)]
pub struct FakeClassifierConfig {
    /// 固定返回的文本
    pub response: String,
    /// 模拟推理延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeClassifierConfig {
    fn default() -> Self {
        Self {
            response: DEFAULT_FAKE_RESPONSE.to_string(),
            latency_ms: 0,
        }
    }
}

/// Fake Classifier
pub struct FakeClassifier {
    config: FakeClassifierConfig,
}

impl FakeClassifier {
    pub fn new(config: FakeClassifierConfig) -> Self {
        tracing::info!(
            latency_ms = config.latency_ms,
            response_len = config.response.len(),
            "FakeClassifier initialized"
        );
        Self { config }
    }

    /// 返回指定文本
    pub fn replying(response: impl Into<String>) -> Self {
        Self::new(FakeClassifierConfig {
            response: response.into(),
            ..Default::default()
        })
    }
}

#[async_trait]
impl VoiceClassifierPort for FakeClassifier {
    async fn classify(
        &self,
        instructions: &str,
        audio: &StagedAudio,
    ) -> Result<String, ClassifierError> {
        tracing::debug!(
            instructions_len = instructions.len(),
            audio_size = audio.size(),
            "FakeClassifier: returning fixed response"
        );

        if self.config.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.latency_ms)).await;
        }

        Ok(self.config.response.clone())
    }
}
