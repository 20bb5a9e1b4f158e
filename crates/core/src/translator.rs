//! The seam between the document pipeline and a translation service.

use crate::language::Language;

/// Text produced for one translation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The service returned a translation.
    Translated(String),
    /// The service could not translate; this is the original text.
    PassedThrough { text: String, reason: String },
}

impl Translation {
    pub fn text(&self) -> &str {
        match self {
            Self::Translated(text) | Self::PassedThrough { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Translated(text) | Self::PassedThrough { text, .. } => text,
        }
    }

    pub fn is_passed_through(&self) -> bool {
        matches!(self, Self::PassedThrough { .. })
    }
}

/// Something that turns source text into text in a target language.
///
/// Implementations never fail: when the service is unavailable they hand the
/// source text back as [`Translation::PassedThrough`].
pub trait Translator {
    fn translate(&self, text: &str, target: Language) -> Translation;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, text: &str, target: Language) -> Translation {
        (**self).translate(text, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_text() {
        let done = Translation::Translated("안녕하세요".to_string());
        assert_eq!(done.text(), "안녕하세요");
        assert!(!done.is_passed_through());

        let kept = Translation::PassedThrough {
            text: "Hello".to_string(),
            reason: "throttled".to_string(),
        };
        assert!(kept.is_passed_through());
        assert_eq!(kept.into_text(), "Hello");
    }
}
