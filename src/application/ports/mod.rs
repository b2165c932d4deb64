//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_staging;
mod voice_classifier;

pub use audio_staging::{AudioStagingPort, StagedAudio, StagingError};
pub use voice_classifier::{ClassifierError, VoiceClassifierPort};
