//! Classification Gateway - 外部分类模型调用的完整生命周期
//!
//! 构造指令 → 有界等待调用模型 → 剥壳解析 → 校验 → 失败策略。
//! 每次请求只调用一次模型，不重试、不缓存

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::prompt::build_instructions;
use super::verdict_parser::parse_verdict;
use crate::application::error::ApplicationError;
use crate::application::ports::{ClassifierError, StagedAudio, VoiceClassifierPort};
use crate::domain::detection::{
    Classification, ConfidenceScore, DetectionResult, Language, VerdictError,
};

/// 兜底结论的说明文本
pub const FALLBACK_EXPLANATION: &str =
    "Voice exhibits mixed natural and synthetic characteristics";

/// 分类失败时的处理策略
///
/// 所有失败类型（网络、超时、JSON 错误、校验失败）统一走同一个分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 返回固定的兜底结论，调用方看不到失败
    #[default]
    Fallback,
    /// 向调用方报告 ClassificationFailed
    Strict,
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fallback => f.write_str("fallback"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// 单次分类失败的原因
#[derive(Debug, Error)]
enum ClassificationFailure {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("classifier did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("invalid verdict: {0}")]
    Verdict(#[from] VerdictError),
}

/// Classification Gateway
pub struct ClassificationGateway {
    classifier: Arc<dyn VoiceClassifierPort>,
    policy: FailurePolicy,
    timeout: Duration,
}

impl ClassificationGateway {
    pub fn new(
        classifier: Arc<dyn VoiceClassifierPort>,
        policy: FailurePolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            policy,
            timeout,
        }
    }

    /// 兜底结论
    pub fn fallback_result(language: &Language) -> DetectionResult {
        DetectionResult::success(
            language.clone(),
            Classification::Human,
            ConfidenceScore::INCONCLUSIVE,
            FALLBACK_EXPLANATION,
        )
    }

    /// 对暂存音频做分类
    pub async fn classify(
        &self,
        audio: &StagedAudio,
        language: &Language,
    ) -> Result<DetectionResult, ApplicationError> {
        match self.try_classify(audio, language).await {
            Ok(result) => {
                tracing::info!(
                    language = %language,
                    classification = %result.classification,
                    confidence = result.confidence.value(),
                    "Voice classified"
                );
                Ok(result)
            }
            Err(failure) => self.on_failure(failure, language),
        }
    }

    async fn try_classify(
        &self,
        audio: &StagedAudio,
        language: &Language,
    ) -> Result<DetectionResult, ClassificationFailure> {
        let instructions = build_instructions(language);

        tracing::debug!(
            language = %language,
            audio_size = audio.size(),
            timeout_ms = self.timeout.as_millis() as u64,
            "Invoking voice classifier"
        );

        let raw = tokio::time::timeout(self.timeout, self.classifier.classify(&instructions, audio))
            .await
            .map_err(|_| ClassificationFailure::TimedOut(self.timeout))??;

        let verdict = parse_verdict(&raw)?;

        Ok(DetectionResult::success(
            language.clone(),
            verdict.classification,
            verdict.confidence,
            verdict.explanation,
        ))
    }

    fn on_failure(
        &self,
        failure: ClassificationFailure,
        language: &Language,
    ) -> Result<DetectionResult, ApplicationError> {
        match self.policy {
            FailurePolicy::Fallback => {
                tracing::warn!(
                    language = %language,
                    policy = %self.policy,
                    reason = %failure,
                    "Classification failed, returning fallback verdict"
                );
                Ok(Self::fallback_result(language))
            }
            FailurePolicy::Strict => {
                tracing::error!(
                    language = %language,
                    policy = %self.policy,
                    reason = %failure,
                    "Classification failed"
                );
                Err(ApplicationError::classification_failed(failure.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{AudioFormat, DetectionStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Script {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct ScriptedClassifier {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedClassifier {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl VoiceClassifierPort for ScriptedClassifier {
        async fn classify(
            &self,
            _instructions: &str,
            _audio: &StagedAudio,
        ) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script {
                Script::Reply(text) => Ok(text.to_string()),
                Script::Fail => Err(ClassifierError::NetworkError("connection refused".into())),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn staged(dir: &tempfile::TempDir) -> StagedAudio {
        StagedAudio::new(dir.path().join("clip.mp3"), AudioFormat::Mp3, 3)
    }

    fn gateway(classifier: Arc<ScriptedClassifier>, policy: FailurePolicy) -> ClassificationGateway {
        ClassificationGateway::new(classifier, policy, Duration::from_millis(50))
    }

    const VALID: &str = r#"```json
{"status":"success","language":"Tamil","classification":"AI_GENERATED","confidenceScore":0.93,"explanation":"Flat prosody"}
```"#;

    const FAILURES: [Script; 4] = [
        Script::Fail,
        Script::Hang,
        Script::Reply("not json at all"),
        Script::Reply(r#"{"classification":"HUMAN","confidenceScore":1.7,"explanation":"x"}"#),
    ];

    #[tokio::test]
    async fn test_success_returns_validated_result() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = ScriptedClassifier::new(Script::Reply(VALID));
        let gw = gateway(classifier.clone(), FailurePolicy::Strict);

        let result = gw
            .classify(&staged(&dir), &Language::new("English"))
            .await
            .unwrap();

        assert_eq!(result.status, DetectionStatus::Success);
        assert_eq!(result.classification, Classification::AiGenerated);
        assert_eq!(result.confidence.value(), 0.93);
        assert_eq!(result.explanation, "Flat prosody");
        // 语言以调用方声明为准
        assert_eq!(result.language.as_str(), "English");
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_policy_masks_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        let language = Language::new("Hindi");

        for script in FAILURES {
            let classifier = ScriptedClassifier::new(script);
            let gw = gateway(classifier.clone(), FailurePolicy::Fallback);

            let result = gw.classify(&staged(&dir), &language).await.unwrap();
            assert_eq!(result, ClassificationGateway::fallback_result(&language));
            assert_eq!(result.classification, Classification::Human);
            assert_eq!(result.confidence.value(), 0.55);
            assert_eq!(result.explanation, FALLBACK_EXPLANATION);
            assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_strict_policy_reports_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        let language = Language::new("Telugu");

        for script in FAILURES {
            let classifier = ScriptedClassifier::new(script);
            let gw = gateway(classifier.clone(), FailurePolicy::Strict);

            let result = gw.classify(&staged(&dir), &language).await;
            assert!(matches!(result, Err(ApplicationError::ClassificationFailed(_))));
            assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: FailurePolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(policy, FailurePolicy::Strict);
        assert_eq!(FailurePolicy::default(), FailurePolicy::Fallback);
    }
}
