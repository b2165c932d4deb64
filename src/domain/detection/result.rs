//! Detection Context - DetectionResult

use serde::Serialize;

use super::{Classification, ConfidenceScore, Language};

/// 结果状态
///
/// 返回 DetectionResult 时总是 Success，错误走单独的错误通道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStatus {
    Success,
    Error,
}

/// 单次检测的结论
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub status: DetectionStatus,
    pub language: Language,
    pub classification: Classification,
    pub confidence: ConfidenceScore,
    pub explanation: String,
}

impl DetectionResult {
    pub fn success(
        language: Language,
        classification: Classification,
        confidence: ConfidenceScore,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            status: DetectionStatus::Success,
            language,
            classification,
            confidence,
            explanation: explanation.into(),
        }
    }
}
