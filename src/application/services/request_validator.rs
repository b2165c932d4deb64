//! Request Validator - 请求前置条件校验
//!
//! 校验顺序固定: 凭证 → 语言 → 音频格式，遇到第一个失败即返回。
//! 无副作用，同一输入总得到同一结论

use base64::{engine::general_purpose, Engine as _};
use std::collections::HashSet;

use crate::application::commands::DetectionRequest;
use crate::application::error::ApplicationError;
use crate::domain::detection::{AudioFormat, Language};

/// 通过校验的请求要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub language: Language,
    pub format: AudioFormat,
}

/// 请求校验器
#[derive(Debug, Clone)]
pub struct RequestValidator {
    api_key: String,
    supported_languages: HashSet<String>,
}

impl RequestValidator {
    pub fn new<I, S>(api_key: impl Into<String>, supported_languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            api_key: api_key.into(),
            supported_languages: supported_languages.into_iter().map(Into::into).collect(),
        }
    }

    /// 只校验凭证
    pub fn authorize(&self, api_key: Option<&str>) -> Result<(), ApplicationError> {
        match api_key {
            Some(key) if key == self.api_key => Ok(()),
            _ => Err(ApplicationError::Unauthorized),
        }
    }

    /// 校验凭证、语言、音频格式
    pub fn validate(
        &self,
        api_key: Option<&str>,
        request: &DetectionRequest,
    ) -> Result<ValidatedRequest, ApplicationError> {
        self.authorize(api_key)?;

        if !self.supported_languages.contains(&request.language) {
            return Err(ApplicationError::UnsupportedLanguage(request.language.clone()));
        }

        let format = AudioFormat::parse(&request.audio_format)
            .ok_or_else(|| ApplicationError::UnsupportedFormat(request.audio_format.clone()))?;

        Ok(ValidatedRequest {
            language: Language::new(request.language.clone()),
            format,
        })
    }

    /// 解码 base64 音频载荷
    ///
    /// 忽略 ASCII 空白（换行折叠的 base64），要求标准字母表和填充。
    /// 解码结果为空同样视为编码错误
    pub fn decode_audio(&self, audio_base64: &str) -> Result<Vec<u8>, ApplicationError> {
        let compact: String = audio_base64
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let audio = general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ApplicationError::InvalidEncoding(e.to_string()))?;

        if audio.is_empty() {
            return Err(ApplicationError::InvalidEncoding(
                "audio payload is empty".to_string(),
            ));
        }

        Ok(audio)
    }
}
