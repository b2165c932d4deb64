//! Voice Detection HTTP Handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::application::{ApplicationError, DetectVoice};
use crate::infrastructure::http::dto::{DetectVoiceBody, DetectVoiceResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 携带凭证的请求头
pub const API_KEY_HEADER: &str = "x-api-key";

/// POST /api/voice-detection
///
/// 凭证在解析请求体之前校验，错误凭证总是 401
pub async fn detect_voice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<DetectVoiceBody>, JsonRejection>,
) -> Result<Json<DetectVoiceResponse>, ApiError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.validator.authorize(api_key.as_deref())?;

    let Json(body) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge("Audio payload too large".to_string())
        } else {
            ApplicationError::InvalidRequest(rejection.body_text()).into()
        }
    })?;

    let command = DetectVoice {
        api_key,
        request: body.into(),
    };
    let result = state.detect_voice_handler.handle(command).await?;

    Ok(Json(result.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ClassificationGateway, FailurePolicy, RequestValidator};
    use crate::domain::detection::DEFAULT_SUPPORTED_LANGUAGES;
    use crate::infrastructure::adapters::{FakeClassifier, TempFileAudioStaging};
    use crate::infrastructure::http::{HttpServer, ServerConfig};
    use axum::{body::Body, http::Request, Router};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::util::ServiceExt;

    const MODEL_REPLY: &str = "```json\n{\"status\":\"success\",\"language\":\"English\",\"classification\":\"AI_GENERATED\",\"confidenceScore\":0.87,\"explanation\":\"Unnaturally even pitch\"}\n```";

    async fn app(dir: &tempfile::TempDir, reply: &str, policy: FailurePolicy) -> Router {
        app_with_config(dir, reply, policy, ServerConfig::default()).await
    }

    async fn app_with_config(
        dir: &tempfile::TempDir,
        reply: &str,
        policy: FailurePolicy,
        config: ServerConfig,
    ) -> Router {
        let validator = Arc::new(RequestValidator::new("123456", DEFAULT_SUPPORTED_LANGUAGES));
        let staging = Arc::new(TempFileAudioStaging::new(dir.path()).await.unwrap());
        let gateway = Arc::new(ClassificationGateway::new(
            Arc::new(FakeClassifier::replying(reply)),
            policy,
            Duration::from_secs(5),
        ));
        let state = AppState::new(validator, staging, gateway);
        HttpServer::new(config, state).router()
    }

    fn detection_request(api_key: Option<&str>, body: String) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/voice-detection")
            .header("content-type", "application/json");
        if let Some(key) = api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn body(language: &str, audio_format: &str, audio_base64: &str) -> String {
        json!({
            "language": language,
            "audioFormat": audio_format,
            "audioBase64": audio_base64,
        })
        .to_string()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_is_public() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Voice Detection API running");
        assert_eq!(json["status"], "operational");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_valid_request_returns_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Strict).await;

        let request = detection_request(Some("123456"), body("English", "mp3", "SUQzBAAAAAAA"));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["language"], "English");
        assert_eq!(json["classification"], "AI_GENERATED");
        assert_eq!(json["confidenceScore"], 0.87);
        assert_eq!(json["explanation"], "Unnaturally even pitch");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_key_is_401_regardless_of_body() {
        let dir = tempfile::tempdir().unwrap();

        let bodies = [
            body("English", "mp3", "SUQzBAAAAAAA"),
            body("French", "wav", "not-base64!!"),
            "{not json".to_string(),
        ];
        for b in bodies {
            let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;
            let (status, json) = send(app, detection_request(Some("wrong"), b)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["status"], "error");
            assert_eq!(json["message"], "Invalid API key");
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_401() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let (status, _) = send(app, detection_request(None, body("English", "mp3", "SUQz"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unsupported_language_is_422() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let request = detection_request(Some("123456"), body("French", "mp3", "SUQzBAAAAAAA"));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Unsupported language: French");
    }

    #[tokio::test]
    async fn test_unsupported_format_is_422() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let request = detection_request(Some("123456"), body("English", "wav", "SUQzBAAAAAAA"));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["message"], "Only MP3 supported");
    }

    #[tokio::test]
    async fn test_invalid_base64_is_422() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let request = detection_request(Some("123456"), body("English", "mp3", "not-base64!!"));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["message"], "Invalid Base64 audio");
    }

    #[tokio::test]
    async fn test_malformed_body_is_422() {
        let dir = tempfile::tempdir().unwrap();

        let bodies = [
            "{not json".to_string(),
            json!({ "language": "English", "audioFormat": "mp3" }).to_string(),
        ];
        for b in bodies {
            let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;
            let (status, json) = send(app, detection_request(Some("123456"), b)).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(json["status"], "error");
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::default().with_max_body_bytes(64);
        let app = app_with_config(&dir, MODEL_REPLY, FailurePolicy::Fallback, config).await;

        let audio = "SUQz".repeat(64);
        let request = detection_request(Some("123456"), body("English", "mp3", &audio));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Audio payload too large");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_bad_model_output_under_fallback_returns_substitute() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(
            &dir,
            r#"{"classification":"HUMAN","confidenceScore":3}"#,
            FailurePolicy::Fallback,
        )
        .await;

        let request = detection_request(Some("123456"), body("Tamil", "MP3", "SUQzBAAAAAAA"));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["language"], "Tamil");
        assert_eq!(json["classification"], "HUMAN");
        assert_eq!(json["confidenceScore"], 0.55);
    }

    #[tokio::test]
    async fn test_bad_model_output_under_strict_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, "Sorry, I cannot help with that.", FailurePolicy::Strict).await;

        let request = detection_request(Some("123456"), body("Hindi", "mp3", "SUQzBAAAAAAA"));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Voice classification failed");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_wrong_method_is_405() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir, MODEL_REPLY, FailurePolicy::Fallback).await;

        let request = Request::builder()
            .uri("/api/voice-detection")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["status"], "error");
    }
}
