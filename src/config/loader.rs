//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量（`VOICECHECK_` 前缀）
//! 2. 配置文件（config.toml）
//! 3. 旧版环境变量（`VALID_API_KEY`、`GOOGLE_API_KEY`、`PORT`）
//! 4. 默认值

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{mask_secret, AppConfig, ClassifierProvider};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 旧版部署使用的环境变量 → 配置键
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("VALID_API_KEY", "auth.api_key"),
    ("GOOGLE_API_KEY", "classifier.api_key"),
    ("PORT", "server.port"),
];

/// 加载应用配置
///
/// # 环境变量示例
/// - `VOICECHECK_SERVER__PORT=8080`
/// - `VOICECHECK_AUTH__API_KEY=secret`
/// - `VOICECHECK_CLASSIFIER__API_KEY=AIza...`
/// - `VOICECHECK_DETECTION__FAILURE_POLICY=strict`
/// - `VOICECHECK_DETECTION__SUPPORTED_LANGUAGES=English,Hindi`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let builder = defaults(Config::builder())?;
    let mut builder = legacy_env(builder, |name| std::env::var(name).ok())?;

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    builder = builder.add_source(env_source());

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 前缀: VOICECHECK_，层级分隔符: __
///
/// 值一律保持字符串，由反序列化按字段类型转换，密钥中的前导零等字符原样保留
fn env_source() -> Environment {
    Environment::with_prefix("VOICECHECK")
        .prefix_separator("_")
        .separator("__")
}

fn defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("server.max_body_bytes", 50 * 1024 * 1024)?
        .set_default("auth.api_key", "123456")?
        .set_default("detection.failure_policy", "fallback")?
        .set_default("classifier.provider", "gemini")?
        .set_default("classifier.api_key", "")?
        .set_default("classifier.base_url", "https://generativelanguage.googleapis.com")?
        .set_default("classifier.model", "gemini-1.5-flash")?
        .set_default("classifier.timeout_secs", 30)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?)
}

/// 旧版环境变量作为默认值，文件和带前缀的环境变量可以覆盖
fn legacy_env<F>(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    for (name, key) in LEGACY_ENV_KEYS {
        if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
            builder = builder.set_default(*key, value)?;
        }
    }
    Ok(builder)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.auth.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "API key cannot be empty".to_string(),
        ));
    }

    if config.detection.supported_languages.is_empty() {
        return Err(ConfigError::ValidationError(
            "At least one supported language is required".to_string(),
        ));
    }

    if !(1..=300).contains(&config.classifier.timeout_secs) {
        return Err(ConfigError::ValidationError(
            "Classifier timeout must be between 1 and 300 seconds".to_string(),
        ));
    }

    if config.classifier.provider == ClassifierProvider::Gemini
        && config.classifier.base_url.is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Classifier base URL cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Max Body: {} bytes", config.server.max_body_bytes);
    tracing::info!("API Key: {}", mask_secret(&config.auth.api_key));
    tracing::info!(
        "Supported Languages: {}",
        config.detection.supported_languages.join(", ")
    );
    tracing::info!("Failure Policy: {}", config.detection.failure_policy);
    tracing::info!("Classifier: {:?}", config.classifier.provider);
    if config.classifier.provider == ClassifierProvider::Gemini {
        tracing::info!("Classifier URL: {}", config.classifier.base_url);
        tracing::info!("Classifier Model: {}", config.classifier.model);
        tracing::info!(
            "Classifier API Key: {}",
            mask_secret(&config.classifier.api_key)
        );
    }
    tracing::info!("Classifier Timeout: {}s", config.classifier.timeout_secs);
    match &config.staging.dir {
        Some(dir) => tracing::info!("Staging Directory: {:?}", dir),
        None => tracing::info!("Staging Directory: <system temp>"),
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
