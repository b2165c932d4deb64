//! Classifier Adapter - 外部语音分类模型客户端实现

mod fake_classifier;
mod gemini_client;

pub use fake_classifier::{FakeClassifier, FakeClassifierConfig, DEFAULT_FAKE_RESPONSE};
pub use gemini_client::*;
