//! 应用层 - 命令
//!
//! 检测用例的命令及处理器

mod detection_commands;

pub mod handlers;

pub use detection_commands::*;
