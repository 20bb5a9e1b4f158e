//! Error types for presentation translation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, rewriting, or saving a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// The requested target language is not in the language table.
    #[error("Unsupported target language '{code}' (supported: {supported})")]
    UnsupportedLanguage { code: String, supported: String },

    /// The presentation could not be loaded; nothing was written.
    #[error("Failed to load presentation: {0}")]
    DocumentLoad(String),

    /// The presentation could not be saved; no output file was produced.
    #[error("Failed to save presentation: {0}")]
    DocumentSave(String),

    /// A text container could not be rebuilt from its template.
    #[error("Reconstruction error: {0}")]
    Reconstruction(String),

    /// A content unit's location no longer resolves to a text container.
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),
}

/// A single formatting attribute could not be read.
///
/// Never escapes template extraction: the field is recorded as unset and
/// the error is logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot read {attribute}: {reason}")]
pub struct AttributeError {
    /// Name of the attribute being read, e.g. `run.color`.
    pub attribute: &'static str,
    /// What went wrong.
    pub reason: String,
    /// The value is well-formed but has no explicit form we can record,
    /// such as a theme color.
    pub unresolved: bool,
}

impl AttributeError {
    pub fn new(attribute: &'static str, reason: impl Into<String>) -> Self {
        Self {
            attribute,
            reason: reason.into(),
            unresolved: false,
        }
    }

    /// A valid value that only resolves through inheritance or the theme.
    pub fn unresolved(attribute: &'static str, reason: impl Into<String>) -> Self {
        Self {
            unresolved: true,
            ..Self::new(attribute, reason)
        }
    }
}
