//! Gemini Client - 调用 Google Gemini REST API
//!
//! 实现 VoiceClassifierPort trait
//!
//! 调用流程:
//! 1. POST {base}/upload/v1beta/files           开启可续传上传，拿到 upload url
//! 2. POST {upload_url}                         上传并 finalize，拿到 file uri
//! 3. POST {base}/v1beta/models/{model}:generateContent  指令 + file_data
//! 4. DELETE {base}/v1beta/{file.name}          清理远端文件（尽力而为）
//!
//! 上传完成后的任何退出路径都会删除远端文件，包括 future 被取消

use async_trait::async_trait;
use reqwest::{header, Body, Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio_util::io::ReaderStream;

use crate::application::ports::{ClassifierError, StagedAudio, VoiceClassifierPort};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// 文件处理中时的轮询间隔
const FILE_POLL_INTERVAL: Duration = Duration::from_millis(500);
const FILE_POLL_MAX_ATTEMPTS: u32 = 20;

/// Gemini 客户端配置
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    /// API 基础 URL
    pub base_url: String,
    /// API Key，为空时客户端处于未配置状态
    pub api_key: String,
    /// 模型名称
    pub model: String,
    /// 单个 HTTP 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for GeminiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 30,
        }
    }
}

impl GeminiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl RemoteFile {
    fn is_processing(&self) -> bool {
        self.state.as_deref() == Some("PROCESSING")
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// 取第一个候选的全部文本片段
fn candidate_text(response: GenerateContentResponse) -> Result<String, ClassifierError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ClassifierError::InvalidResponse(
            "no text in first candidate".to_string(),
        ));
    }
    Ok(text)
}

fn map_send_error(e: reqwest::Error) -> ClassifierError {
    if e.is_timeout() {
        ClassifierError::Timeout
    } else if e.is_connect() {
        ClassifierError::NetworkError(format!("Cannot connect to Gemini API: {}", e))
    } else {
        ClassifierError::NetworkError(e.to_string())
    }
}

/// 非 2xx 转为 ServiceError
async fn ensure_success(response: Response) -> Result<Response, ClassifierError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(ClassifierError::ServiceError(format!(
        "HTTP {}: {}",
        status, error_text
    )))
}

// ============================================================================
// Remote file cleanup
// ============================================================================

/// 删除一个远端文件所需的全部信息，可以脱离客户端单独发送
struct RemoteDelete {
    client: Client,
    url: String,
    api_key: String,
    name: String,
}

impl RemoteDelete {
    /// 失败只记日志
    async fn send(self) {
        let result = self
            .client
            .delete(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(name = %self.name, "Remote audio deleted");
            }
            Ok(response) => {
                tracing::warn!(name = %self.name, status = %response.status(), "Failed to delete remote audio");
            }
            Err(e) => {
                tracing::warn!(name = %self.name, error = %e, "Failed to delete remote audio");
            }
        }
    }
}

/// 已上传的远端文件
///
/// 正常路径调用 `delete`；未调用就被 drop 时（调用方超时取消）
/// 在当前 runtime 上补发删除
struct RemoteFileGuard {
    pending: Option<RemoteDelete>,
}

impl RemoteFileGuard {
    async fn delete(mut self) {
        if let Some(request) = self.pending.take() {
            request.send().await;
        }
    }
}

impl Drop for RemoteFileGuard {
    fn drop(&mut self) {
        let Some(request) = self.pending.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(name = %request.name, "Classification cancelled, deleting remote audio in background");
                handle.spawn(request.send());
            }
            Err(_) => {
                tracing::warn!(name = %request.name, "No runtime available, remote audio left behind");
            }
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gemini 客户端
pub struct GeminiClient {
    client: Client,
    config: GeminiClientConfig,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: GeminiClientConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::NetworkError(e.to_string()))?;

        let config = GeminiClientConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ..config
        };

        Ok(Self { client, config })
    }

    /// 是否已配置 API Key
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn upload_start_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.config.base_url)
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    fn file_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.config.base_url, name)
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.config.base_url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.config.api_key)
    }

    fn guard(&self, file: &RemoteFile) -> RemoteFileGuard {
        RemoteFileGuard {
            pending: Some(RemoteDelete {
                client: self.client.clone(),
                url: self.file_url(&file.name),
                api_key: self.config.api_key.clone(),
                name: file.name.clone(),
            }),
        }
    }

    /// 可续传上传: start 之后一次性 upload + finalize
    ///
    /// 返回的文件可能仍在处理中
    async fn upload(&self, audio: &StagedAudio) -> Result<RemoteFile, ClassifierError> {
        let start = self
            .authed(self.client.post(self.upload_start_url()))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", audio.size())
            .header("X-Goog-Upload-Header-Content-Type", audio.mime_type())
            .json(&json!({ "file": { "display_name": "voice-sample" } }))
            .send()
            .await
            .map_err(map_send_error)?;
        let start = ensure_success(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                ClassifierError::InvalidResponse("missing upload url header".to_string())
            })?;

        let file = tokio::fs::File::open(audio.path())
            .await
            .map_err(|e| ClassifierError::AudioUnavailable(e.to_string()))?;

        let response = self
            .client
            .post(&upload_url)
            .header(header::CONTENT_LENGTH, audio.size())
            .header("X-Goog-Upload-Offset", 0)
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await
            .map_err(map_send_error)?;

        let uploaded: UploadResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(format!("upload response: {}", e)))?;

        tracing::debug!(
            name = %uploaded.file.name,
            mime_type = ?uploaded.file.mime_type,
            size = audio.size(),
            "Audio uploaded to Gemini"
        );

        Ok(uploaded.file)
    }

    /// 音频偶尔需要短暂处理后才能引用
    async fn wait_until_active(&self, mut file: RemoteFile) -> Result<RemoteFile, ClassifierError> {
        let mut attempts = 0;
        while file.is_processing() {
            if attempts >= FILE_POLL_MAX_ATTEMPTS {
                return Err(ClassifierError::Timeout);
            }
            attempts += 1;
            tokio::time::sleep(FILE_POLL_INTERVAL).await;

            let response = self
                .authed(self.client.get(self.file_url(&file.name)))
                .send()
                .await
                .map_err(map_send_error)?;
            file = ensure_success(response)
                .await?
                .json()
                .await
                .map_err(|e| ClassifierError::InvalidResponse(format!("file status: {}", e)))?;
        }

        if file.state.as_deref() == Some("FAILED") {
            return Err(ClassifierError::ServiceError(format!(
                "file processing failed: {}",
                file.name
            )));
        }
        Ok(file)
    }

    async fn generate(
        &self,
        instructions: &str,
        file: &RemoteFile,
        mime_type: &str,
    ) -> Result<String, ClassifierError> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "text": instructions },
                    { "file_data": { "mime_type": mime_type, "file_uri": file.uri } }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.0
            }
        });

        let response = self
            .authed(self.client.post(self.generate_url()))
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let parsed: GenerateContentResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        candidate_text(parsed)
    }
}

#[async_trait]
impl VoiceClassifierPort for GeminiClient {
    async fn classify(
        &self,
        instructions: &str,
        audio: &StagedAudio,
    ) -> Result<String, ClassifierError> {
        if !self.is_configured() {
            return Err(ClassifierError::NotConfigured(
                "Gemini API key is not set".to_string(),
            ));
        }

        tracing::debug!(
            model = %self.config.model,
            audio_size = audio.size(),
            "Sending Gemini classification request"
        );

        let uploaded = self.upload(audio).await?;
        let remote = self.guard(&uploaded);

        let result = match self.wait_until_active(uploaded).await {
            Ok(file) => self.generate(instructions, &file, audio.mime_type()).await,
            Err(e) => Err(e),
        };
        remote.delete().await;

        let text = result?;
        tracing::info!(
            model = %self.config.model,
            response_len = text.len(),
            "Gemini classification completed"
        );
        Ok(text)
    }

    async fn health_check(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        match self
            .authed(self.client.get(self.models_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
