//! Domain Layer - 领域层
//!
//! 只有一个限界上下文:
//! - Detection Context: 语音真伪检测

pub mod detection;
