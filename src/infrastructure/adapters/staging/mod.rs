//! Staging Adapter - 请求级音频暂存实现

mod temp_file_staging;

pub use temp_file_staging::TempFileAudioStaging;
