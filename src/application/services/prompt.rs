//! 分类指令构造

use crate::domain::detection::Language;

/// 构造发给外部模型的指令
///
/// 指令列出两种允许的结论、置信度区间、期望的 JSON 形状，
/// 并禁止 JSON 以外的任何文本
pub fn build_instructions(language: &Language) -> String {
    format!(
        r#"You are an expert voice detection system.

Analyze the attached MP3 audio and determine whether the voice is AI_GENERATED or HUMAN.

The speech in the audio is in {language}.

Base your decision ONLY on voice characteristics such as pitch stability, breath sounds, timing, prosody, and natural imperfections.

Rules:
- "classification" must be exactly "AI_GENERATED" or "HUMAN".
- "confidenceScore" must be a number between 0.0 and 1.0 inclusive.
- "explanation" must be one short sentence naming the cues you relied on.

Return ONLY one valid JSON object with exactly this shape. Do not wrap it in markdown, do not add any text before or after it:

{{
  "status": "success",
  "language": "{language}",
  "classification": "HUMAN",
  "confidenceScore": 0.85,
  "explanation": "Natural pitch variation and breathing detected"
}}"#,
        language = language
    )
}
