//! HTTP Handlers

mod detection;
mod root;

pub use detection::*;
pub use root::*;
