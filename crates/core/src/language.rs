//! The fixed table of supported target languages.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported translation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
    Ja,
    Zh,
    Fr,
    De,
    Es,
    It,
    Pt,
    Ru,
}

impl Language {
    /// Every supported language, in table order.
    pub const ALL: [Language; 10] = [
        Language::Ko,
        Language::En,
        Language::Ja,
        Language::Zh,
        Language::Fr,
        Language::De,
        Language::Es,
        Language::It,
        Language::Pt,
        Language::Ru,
    ];

    /// Look up a language by its two-letter code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "ko" => Some(Self::Ko),
            "en" => Some(Self::En),
            "ja" => Some(Self::Ja),
            "zh" => Some(Self::Zh),
            "fr" => Some(Self::Fr),
            "de" => Some(Self::De),
            "es" => Some(Self::Es),
            "it" => Some(Self::It),
            "pt" => Some(Self::Pt),
            "ru" => Some(Self::Ru),
            _ => None,
        }
    }

    /// Like [`Language::from_code`], but reports the supported codes on failure.
    pub fn parse(code: &str) -> Result<Self> {
        Self::from_code(code).ok_or_else(|| Error::UnsupportedLanguage {
            code: code.to_string(),
            supported: Self::ALL
                .iter()
                .map(|l| l.code())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
            Self::Ja => "ja",
            Self::Zh => "zh",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Es => "es",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Ru => "ru",
        }
    }

    /// Human-readable name, used in the translation instructions.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Ko => "Korean",
            Self::En => "English",
            Self::Ja => "Japanese",
            Self::Zh => "Chinese",
            Self::Fr => "French",
            Self::De => "German",
            Self::Es => "Spanish",
            Self::It => "Italian",
            Self::Pt => "Portuguese",
            Self::Ru => "Russian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.code())
    }
}
