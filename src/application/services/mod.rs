//! Application Services
//!
//! - RequestValidator: 请求前置条件
//! - ClassificationGateway: 外部模型调用、结论校验与失败策略

mod classification_gateway;
mod prompt;
mod request_validator;
mod verdict_parser;

pub use classification_gateway::{ClassificationGateway, FailurePolicy, FALLBACK_EXPLANATION};
pub use prompt::build_instructions;
pub use request_validator::{RequestValidator, ValidatedRequest};
pub use verdict_parser::{parse_verdict, strip_code_fence, Verdict};
