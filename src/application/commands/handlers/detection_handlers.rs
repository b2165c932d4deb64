//! Detection Command Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::DetectVoice;
use crate::application::error::ApplicationError;
use crate::application::ports::AudioStagingPort;
use crate::application::services::{ClassificationGateway, RequestValidator};
use crate::domain::detection::DetectionResult;

// ============================================================================
// DetectVoice
// ============================================================================

/// DetectVoice Handler
///
/// 校验 → 解码 → 暂存 → 分类。廉价的校验全部在调用外部模型之前完成
pub struct DetectVoiceHandler {
    validator: Arc<RequestValidator>,
    staging: Arc<dyn AudioStagingPort>,
    gateway: Arc<ClassificationGateway>,
}

impl DetectVoiceHandler {
    pub fn new(
        validator: Arc<RequestValidator>,
        staging: Arc<dyn AudioStagingPort>,
        gateway: Arc<ClassificationGateway>,
    ) -> Self {
        Self {
            validator,
            staging,
            gateway,
        }
    }

    pub async fn handle(&self, command: DetectVoice) -> Result<DetectionResult, ApplicationError> {
        let request_id = Uuid::new_v4();

        let validated = self
            .validator
            .validate(command.api_key.as_deref(), &command.request)?;
        let audio = self.validator.decode_audio(&command.request.audio_base64)?;

        tracing::info!(
            request_id = %request_id,
            language = %validated.language,
            audio_size = audio.len(),
            "Voice detection requested"
        );

        // staged 在本函数返回时 drop，临时文件随之删除
        let staged = self.staging.stage(&audio, validated.format).await?;
        drop(audio);

        let result = self.gateway.classify(&staged, &validated.language).await?;

        tracing::info!(
            request_id = %request_id,
            classification = %result.classification,
            confidence = result.confidence.value(),
            "Voice detection completed"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::DetectionRequest;
    use crate::application::ports::{ClassifierError, StagedAudio, VoiceClassifierPort};
    use crate::application::services::FailurePolicy;
    use crate::domain::detection::{Classification, DEFAULT_SUPPORTED_LANGUAGES};
    use crate::infrastructure::adapters::TempFileAudioStaging;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 记录调用时暂存文件是否存在
    struct ProbeClassifier {
        reply: Option<&'static str>,
        calls: AtomicUsize,
        saw_file: AtomicUsize,
    }

    #[async_trait]
    impl VoiceClassifierPort for ProbeClassifier {
        async fn classify(
            &self,
            _instructions: &str,
            audio: &StagedAudio,
        ) -> Result<String, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if audio.path().exists() && audio.size() > 0 {
                self.saw_file.fetch_add(1, Ordering::SeqCst);
            }
            self.reply
                .map(str::to_string)
                .ok_or_else(|| ClassifierError::ServiceError("HTTP 503".into()))
        }
    }

    fn probe(reply: Option<&'static str>) -> Arc<ProbeClassifier> {
        Arc::new(ProbeClassifier {
            reply,
            calls: AtomicUsize::new(0),
            saw_file: AtomicUsize::new(0),
        })
    }

    async fn handler(
        dir: &Path,
        classifier: Arc<ProbeClassifier>,
        policy: FailurePolicy,
    ) -> DetectVoiceHandler {
        let validator = Arc::new(RequestValidator::new("123456", DEFAULT_SUPPORTED_LANGUAGES));
        let staging = Arc::new(TempFileAudioStaging::new(dir).await.unwrap());
        let gateway = Arc::new(ClassificationGateway::new(
            classifier,
            policy,
            Duration::from_secs(5),
        ));
        DetectVoiceHandler::new(validator, staging, gateway)
    }

    fn command(api_key: &str, language: &str, audio_base64: &str) -> DetectVoice {
        DetectVoice {
            api_key: Some(api_key.to_string()),
            request: DetectionRequest {
                language: language.to_string(),
                audio_format: "mp3".to_string(),
                audio_base64: audio_base64.to_string(),
            },
        }
    }

    fn staged_files(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    const REPLY: &str =
        r#"{"classification":"HUMAN","confidenceScore":0.8,"explanation":"Breathing artifacts"}"#;

    #[tokio::test]
    async fn test_success_releases_staged_audio() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = probe(Some(REPLY));
        let handler = handler(dir.path(), classifier.clone(), FailurePolicy::Strict).await;

        let result = handler
            .handle(command("123456", "English", "SUQzBAAAAAAA"))
            .await
            .unwrap();

        assert_eq!(result.classification, Classification::Human);
        assert_eq!(classifier.saw_file.load(Ordering::SeqCst), 1);
        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_strict_failure_releases_staged_audio() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = probe(None);
        let handler = handler(dir.path(), classifier.clone(), FailurePolicy::Strict).await;

        let result = handler
            .handle(command("123456", "English", "SUQzBAAAAAAA"))
            .await;

        assert!(matches!(result, Err(ApplicationError::ClassificationFailed(_))));
        assert_eq!(classifier.saw_file.load(Ordering::SeqCst), 1);
        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_fallback_failure_releases_staged_audio() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path(), probe(None), FailurePolicy::Fallback).await;

        let result = handler
            .handle(command("123456", "Tamil", "SUQzBAAAAAAA"))
            .await
            .unwrap();

        assert_eq!(result.confidence.value(), 0.55);
        assert_eq!(staged_files(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_validation_errors_never_reach_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = probe(Some(REPLY));
        let handler = handler(dir.path(), classifier.clone(), FailurePolicy::Fallback).await;

        let cases = [
            command("wrong", "English", "SUQzBAAAAAAA"),
            command("123456", "French", "SUQzBAAAAAAA"),
            command("123456", "English", "not-base64!!"),
        ];
        for cmd in cases {
            assert!(handler.handle(cmd).await.is_err());
        }

        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(staged_files(dir.path()), 0);
    }
}
