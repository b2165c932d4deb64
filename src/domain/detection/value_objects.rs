//! Detection Context - Value Objects

use serde::{Deserialize, Serialize};

use super::VerdictError;

/// 声明语言
///
/// 原样保存调用方声明的语言名称，是否受支持由 RequestValidator 判定
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language(String);

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 默认支持的语言集合
pub const DEFAULT_SUPPORTED_LANGUAGES: [&str; 5] =
    ["Tamil", "English", "Hindi", "Malayalam", "Telugu"];

/// 音频格式
///
/// 目前只接受 MP3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
}

impl AudioFormat {
    /// 大小写不敏感解析
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
        }
    }
}

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "AI_GENERATED")]
    AiGenerated,
    #[serde(rename = "HUMAN")]
    Human,
}

impl Classification {
    /// 严格匹配模型返回的标签（区分大小写，不做模糊匹配）
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "AI_GENERATED" => Some(Self::AiGenerated),
            "HUMAN" => Some(Self::Human),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI_GENERATED",
            Self::Human => "HUMAN",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 置信度
///
/// 不变量: 有限值且位于闭区间 [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    /// 信号不明确时使用的置信度
    pub const INCONCLUSIVE: ConfidenceScore = ConfidenceScore(0.55);

    pub fn new(value: f64) -> Result<Self, VerdictError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(VerdictError::ConfidenceOutOfRange(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}
