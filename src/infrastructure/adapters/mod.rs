//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod classifier;
pub mod staging;

pub use classifier::*;
pub use staging::*;
