//! Command Handlers 实现

mod detection_handlers;

pub use detection_handlers::*;
