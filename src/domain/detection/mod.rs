//! Detection Context - 语音真伪检测限界上下文
//!
//! 职责:
//! - 请求侧值对象（语言、音频格式）
//! - 结论值对象（分类、置信度）
//! - 模型输出校验错误

mod errors;
mod result;
mod value_objects;

pub use errors::VerdictError;
pub use result::{DetectionResult, DetectionStatus};
pub use value_objects::{
    AudioFormat, Classification, ConfidenceScore, Language, DEFAULT_SUPPORTED_LANGUAGES,
};
