//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::DetectionRequest;
use crate::domain::detection::{Classification, DetectionResult, DetectionStatus};

// ============================================================================
// Root
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

// ============================================================================
// Voice detection DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectVoiceBody {
    pub language: String,
    pub audio_format: String,
    pub audio_base64: String,
}

impl From<DetectVoiceBody> for DetectionRequest {
    fn from(body: DetectVoiceBody) -> Self {
        Self {
            language: body.language,
            audio_format: body.audio_format,
            audio_base64: body.audio_base64,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectVoiceResponse {
    pub status: DetectionStatus,
    pub language: String,
    pub classification: Classification,
    pub confidence_score: f64,
    pub explanation: String,
}

impl From<DetectionResult> for DetectVoiceResponse {
    fn from(result: DetectionResult) -> Self {
        Self {
            status: result.status,
            language: result.language.as_str().to_string(),
            classification: result.classification,
            confidence_score: result.confidence.value(),
            explanation: result.explanation,
        }
    }
}
