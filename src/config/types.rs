//! Configuration Types
//!
//! 定义所有配置结构体

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

use crate::application::FailurePolicy;
use crate::domain::detection::DEFAULT_SUPPORTED_LANGUAGES;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 鉴权配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 检测策略配置
    #[serde(default)]
    pub detection: DetectionConfig,

    /// 外部分类器配置
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// 音频暂存配置
    #[serde(default)]
    pub staging: StagingConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024 // 50 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 鉴权配置
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// 共享密钥，通过 x-api-key 请求头携带
    #[serde(default = "default_api_key")]
    pub api_key: String,
}

fn default_api_key() -> String {
    "123456".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
        }
    }
}

/// 检测策略配置
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// 支持的语言（区分大小写）
    #[serde(
        default = "default_supported_languages",
        deserialize_with = "deserialize_language_list"
    )]
    pub supported_languages: Vec<String>,

    /// 外部分类失败时的策略: fallback / strict
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

fn default_supported_languages() -> Vec<String> {
    DEFAULT_SUPPORTED_LANGUAGES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// 配置文件中为数组，环境变量中为逗号分隔的字符串
fn deserialize_language_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Languages {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match Languages::deserialize(deserializer)? {
        Languages::List(list) => list,
        Languages::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            supported_languages: default_supported_languages(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// 分类器实现
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    #[default]
    Gemini,
    Fake,
}

/// 外部分类器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// 使用的实现
    #[serde(default)]
    pub provider: ClassifierProvider,

    /// Gemini API Key
    #[serde(default)]
    pub api_key: String,

    /// Gemini API 基础 URL
    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,

    /// 模型名称
    #[serde(default = "default_classifier_model")]
    pub model: String,

    /// 调用超时时间（秒），超时按分类失败处理
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,

    /// fake 实现返回的固定文本，为空时使用内置回答
    #[serde(default)]
    pub fake_response: Option<String>,

    /// fake 实现的模拟延迟（毫秒）
    #[serde(default)]
    pub fake_latency_ms: u64,
}

fn default_classifier_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_classifier_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_classifier_timeout() -> u64 {
    30
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::default(),
            api_key: String::new(),
            base_url: default_classifier_base_url(),
            model: default_classifier_model(),
            timeout_secs: default_classifier_timeout(),
            fake_response: None,
            fake_latency_ms: 0,
        }
    }
}

/// 音频暂存配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StagingConfig {
    /// 暂存目录，未设置时使用系统临时目录
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// 打码后的密钥，用于日志
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let visible: String = secret.chars().take(2).collect();
    format!("{}***", visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8000");
        assert_eq!(config.auth.api_key, "123456");
        assert_eq!(config.detection.supported_languages.len(), 5);
        assert_eq!(config.detection.failure_policy, FailurePolicy::Fallback);
        assert_eq!(config.classifier.provider, ClassifierProvider::Gemini);
        assert_eq!(config.classifier.model, "gemini-1.5-flash");
        assert_eq!(config.classifier.timeout_secs, 30);
        assert!(config.staging.dir.is_none());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "<unset>");
        assert_eq!(mask_secret("AIzaSyA"), "AI***");
        assert_eq!(mask_secret("x"), "x***");
    }
}
