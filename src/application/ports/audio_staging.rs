//! Audio Staging Port - 请求级音频暂存抽象
//!
//! 解码后的音频在调用外部模型前先写入临时文件

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::detection::AudioFormat;

/// 暂存错误
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("IO error: {0}")]
    IoError(String),
}

/// 已暂存的音频
///
/// 拥有临时文件的生命周期: drop 时删除文件。
/// 删除失败只记录日志，不向调用方报告
#[derive(Debug)]
pub struct StagedAudio {
    path: PathBuf,
    format: AudioFormat,
    size: u64,
}

impl StagedAudio {
    pub fn new(path: PathBuf, format: AudioFormat, size: u64) -> Self {
        Self { path, format, size }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// 音频字节数
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for StagedAudio {
    fn drop(&mut self) {
        // 单次 unlink 同步执行，返回前文件已删除
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Staged audio released");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove staged audio"
                );
            }
        }
    }
}

/// Audio Staging Port
#[async_trait]
pub trait AudioStagingPort: Send + Sync {
    /// 将音频写入一个新的、请求独占的临时文件
    async fn stage(&self, audio: &[u8], format: AudioFormat) -> Result<StagedAudio, StagingError>;
}
