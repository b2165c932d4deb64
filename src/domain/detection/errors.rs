//! Detection Context - Errors

use thiserror::Error;

/// 模型输出校验错误
#[derive(Debug, Error, PartialEq)]
pub enum VerdictError {
    #[error("response is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid classification: {0}")]
    InvalidClassification(String),

    #[error("confidence is not a number: {0}")]
    InvalidConfidence(String),

    #[error("confidence out of range: {0}")]
    ConfidenceOutOfRange(f64),

    #[error("explanation is empty")]
    EmptyExplanation,
}
