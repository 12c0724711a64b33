//! Script-based language detection

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const TELUGU_BLOCK: RangeInclusive<char> = '\u{0C00}'..='\u{0C7F}';
const DEVANAGARI_BLOCK: RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Languages the triage chat supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "te")]
    Telugu,
    #[serde(rename = "hi")]
    Hindi,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Telugu => "te",
            Language::Hindi => "hi",
        }
    }
}

/// Guess the language of `text` from the Unicode blocks it uses
///
/// Telugu script takes precedence over Devanagari; anything else is English.
pub fn detect_language(text: &str) -> Language {
    if text.chars().any(|c| TELUGU_BLOCK.contains(&c)) {
        Language::Telugu
    } else if text.chars().any(|c| DEVANAGARI_BLOCK.contains(&c)) {
        Language::Hindi
    } else {
        Language::English
    }
}
