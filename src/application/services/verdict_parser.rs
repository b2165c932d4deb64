//! 模型回答解析与校验
//!
//! 模型偶尔会给 JSON 包一层 markdown 代码块，解析前先剥掉。
//! 解析失败与语义校验失败同等对待

use serde_json::{Map, Value};

use crate::domain::detection::{Classification, ConfidenceScore, VerdictError};

/// 通过校验的模型结论
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub classification: Classification,
    pub confidence: ConfidenceScore,
    pub explanation: String,
}

/// 剥掉首尾的 markdown 代码块标记
///
/// 支持 ```` ``` ```` 和 ```` ```json ````（标签大小写不敏感）
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        let rest = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
        text = rest.trim_start();
    }

    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end();
    }

    text
}

/// 解析并校验模型回答
pub fn parse_verdict(raw: &str) -> Result<Verdict, VerdictError> {
    let body = strip_code_fence(raw);

    let value: Value =
        serde_json::from_str(body).map_err(|e| VerdictError::MalformedJson(e.to_string()))?;
    let object = value.as_object().ok_or(VerdictError::NotAnObject)?;

    let classification = parse_classification(object)?;
    let confidence = parse_confidence(object)?;
    let explanation = parse_explanation(object)?;

    Ok(Verdict {
        classification,
        confidence,
        explanation,
    })
}

fn parse_classification(object: &Map<String, Value>) -> Result<Classification, VerdictError> {
    match object.get("classification") {
        None | Some(Value::Null) => Err(VerdictError::MissingField("classification")),
        Some(Value::String(label)) => Classification::from_label(label)
            .ok_or_else(|| VerdictError::InvalidClassification(label.clone())),
        Some(other) => Err(VerdictError::InvalidClassification(other.to_string())),
    }
}

/// 置信度可以是数字，也可以是数字字符串；布尔值不接受
fn parse_confidence(object: &Map<String, Value>) -> Result<ConfidenceScore, VerdictError> {
    let value = match object.get("confidenceScore") {
        None | Some(Value::Null) => return Err(VerdictError::MissingField("confidenceScore")),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| VerdictError::InvalidConfidence(n.to_string()))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| VerdictError::InvalidConfidence(s.clone()))?,
        Some(other) => return Err(VerdictError::InvalidConfidence(other.to_string())),
    };

    ConfidenceScore::new(value)
}

fn parse_explanation(object: &Map<String, Value>) -> Result<String, VerdictError> {
    match object.get("explanation") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(VerdictError::EmptyExplanation),
        _ => Err(VerdictError::MissingField("explanation")),
    }
}
