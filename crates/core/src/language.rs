//! Answer languages
//!
//! Queries arrive in English, Hindi (Devanagari) or Hinglish (Hindi in Roman
//! script, usually mixed with English tokens).

use serde::{Deserialize, Serialize};

/// Supported answer languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Hinglish,
}

impl Language {
    /// Wire code used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Hinglish => "hinglish",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Hinglish => "Hinglish",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "en" | "eng" | "english" | "en-in" | "en-us" | "en-gb" => Some(Self::English),
            "hi" | "hin" | "hindi" | "hi-in" => Some(Self::Hindi),
            "hinglish" | "hi-latn" | "hien" | "hi-en" => Some(Self::Hinglish),
            _ => None,
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [Language] {
        &[Self::English, Self::Hindi, Self::Hinglish]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether a character is in the Devanagari block (U+0900..U+097F)
pub fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}
