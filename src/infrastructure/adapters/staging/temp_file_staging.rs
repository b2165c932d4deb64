//! Temp File Staging - 临时文件音频暂存实现
//!
//! 实现 AudioStagingPort trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{AudioStagingPort, StagedAudio, StagingError};
use crate::domain::detection::AudioFormat;

/// 临时文件暂存
pub struct TempFileAudioStaging {
    /// 暂存目录
    dir: PathBuf,
}

impl TempFileAudioStaging {
    /// 创建暂存器，确保目录存在
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, StagingError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StagingError::IoError(e.to_string()))?;

        Ok(Self { dir })
    }

    /// 使用系统临时目录
    pub async fn in_system_temp() -> Result<Self, StagingError> {
        Self::new(std::env::temp_dir()).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AudioStagingPort for TempFileAudioStaging {
    async fn stage(&self, audio: &[u8], format: AudioFormat) -> Result<StagedAudio, StagingError> {
        let suffix = format!(".{}", format.extension());
        let (file, path) = tempfile::Builder::new()
            .prefix("voice-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)
            .and_then(|named| named.keep().map_err(|e| e.error))
            .map_err(|e| StagingError::IoError(e.to_string()))?;

        // 先交给 StagedAudio，写入失败时同样会被删除
        let staged = StagedAudio::new(path, format, audio.len() as u64);

        let mut file = fs::File::from_std(file);
        file.write_all(audio)
            .await
            .map_err(|e| StagingError::IoError(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| StagingError::IoError(e.to_string()))?;

        tracing::debug!(
            path = %staged.path().display(),
            size = audio.len(),
            "Staged audio"
        );

        Ok(staged)
    }
}
