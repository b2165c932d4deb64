//! voicecheck - AI 合成语音检测服务
//!
//! 启动顺序: 配置 → 日志 → 分类器 → 暂存 → 校验器/网关 → HTTP 服务器

use std::sync::Arc;
use std::time::Duration;

use voicecheck::application::{
    AudioStagingPort, ClassificationGateway, RequestValidator, VoiceClassifierPort,
};
use voicecheck::config::{load_config, print_config, AppConfig, ClassifierProvider};
use voicecheck::infrastructure::adapters::{
    FakeClassifier, FakeClassifierConfig, GeminiClient, GeminiClientConfig, TempFileAudioStaging,
    DEFAULT_FAKE_RESPONSE,
};
use voicecheck::infrastructure::http::{AppState, HttpServer, ServerConfig};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},voicecheck={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

fn build_classifier(config: &AppConfig) -> anyhow::Result<Arc<dyn VoiceClassifierPort>> {
    let classifier: Arc<dyn VoiceClassifierPort> = match config.classifier.provider {
        ClassifierProvider::Gemini => {
            let gemini_config = GeminiClientConfig {
                base_url: config.classifier.base_url.clone(),
                api_key: config.classifier.api_key.clone(),
                model: config.classifier.model.clone(),
                timeout_secs: config.classifier.timeout_secs,
            };
            let client = GeminiClient::new(gemini_config)?;
            if !client.is_configured() {
                tracing::warn!(
                    "Gemini API key is not set, every classification will be handled by the {} policy",
                    config.detection.failure_policy
                );
            }
            Arc::new(client)
        }
        ClassifierProvider::Fake => Arc::new(FakeClassifier::new(FakeClassifierConfig {
            response: config
                .classifier
                .fake_response
                .clone()
                .unwrap_or_else(|| DEFAULT_FAKE_RESPONSE.to_string()),
            latency_ms: config.classifier.fake_latency_ms,
        })),
    };
    Ok(classifier)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 旧版环境变量 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("voicecheck - Voice Detection API v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    if config.auth.api_key == "123456" {
        tracing::warn!("Using the default API key, set VOICECHECK_AUTH__API_KEY in production");
    }

    // 外部分类器
    let classifier = build_classifier(&config)?;

    // 启动时探测一次，只记录结果
    let probe = classifier.clone();
    tokio::spawn(async move {
        if probe.health_check().await {
            tracing::info!("Voice classifier reachable");
        } else {
            tracing::warn!("Voice classifier health check failed");
        }
    });

    // 音频暂存
    let staging: Arc<dyn AudioStagingPort> = match &config.staging.dir {
        Some(dir) => Arc::new(TempFileAudioStaging::new(dir).await?),
        None => Arc::new(TempFileAudioStaging::in_system_temp().await?),
    };

    // 校验器与分类网关
    let validator = Arc::new(RequestValidator::new(
        config.auth.api_key.clone(),
        config.detection.supported_languages.clone(),
    ));
    let gateway = Arc::new(ClassificationGateway::new(
        classifier,
        config.detection.failure_policy,
        Duration::from_secs(config.classifier.timeout_secs),
    ));

    let state = AppState::new(validator, staging, gateway);

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.server.max_body_bytes);
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
