//! Core domain types, formatting templates, and run distribution
//! for template-preserving presentation translation.

pub mod distribute;
pub mod error;
pub mod language;
pub mod template;
pub mod translator;
pub mod types;

pub use distribute::{distribute, segment_sentences, Segment};
pub use error::{AttributeError, Error, Result};
pub use language::Language;
pub use template::{
    Alignment, AutoSize, LineSpacing, Margins, ParagraphTemplate, Rgb, RichTextTemplate,
    RunTemplate,
};
pub use translator::{Translation, Translator};
pub use types::{
    ContentBlockRef, ElementKind, PresentationFormat, Reconstruction, RunSummary, SlideOutcome,
    TranslationUnit,
};
