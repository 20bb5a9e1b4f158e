//! Domain types for locating, translating, and reporting on content units.

use crate::template::RichTextTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The format of a source presentation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationFormat {
    /// Modern PPTX (Office Open XML).
    Pptx,
    /// Legacy PPT (OLE/CFB binary). Detected only to be rejected.
    Ppt,
}

impl PresentationFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "ppt" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PPTX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Pptx);
        }

        // PPT is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Ppt);
        }

        None
    }
}

/// What kind of element a content unit was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Plain,
    Grouped,
    TableCell,
    ChartTitle,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Grouped => "grouped",
            Self::TableCell => "table-cell",
            Self::ChartTitle => "chart-title",
        }
    }
}

/// Where on a slide a content unit lives.
///
/// Block indices count the slide's top-level shapes in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentBlockRef {
    /// Text held directly by a top-level shape.
    Plain { block: usize },
    /// Text held by an immediate child of a group shape.
    Grouped { block: usize, child: usize },
    /// Text in one cell of a table frame.
    TableCell { block: usize, row: usize, col: usize },
    /// The title of a chart frame.
    ChartTitle { block: usize },
}

impl ContentBlockRef {
    pub fn block(&self) -> usize {
        match *self {
            Self::Plain { block }
            | Self::Grouped { block, .. }
            | Self::TableCell { block, .. }
            | Self::ChartTitle { block } => block,
        }
    }

    pub fn child(&self) -> Option<usize> {
        match *self {
            Self::Grouped { child, .. } => Some(child),
            _ => None,
        }
    }

    pub fn cell(&self) -> Option<(usize, usize)> {
        match *self {
            Self::TableCell { row, col, .. } => Some((row, col)),
            _ => None,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Plain { .. } => ElementKind::Plain,
            Self::Grouped { .. } => ElementKind::Grouped,
            Self::TableCell { .. } => ElementKind::TableCell,
            Self::ChartTitle { .. } => ElementKind::ChartTitle,
        }
    }
}

impl fmt::Display for ContentBlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Plain { block } => write!(f, "shape {}", block),
            Self::Grouped { block, child } => write!(f, "shape {} child {}", block, child),
            Self::TableCell { block, row, col } => {
                write!(f, "shape {} cell [{},{}]", block, row, col)
            }
            Self::ChartTitle { block } => write!(f, "shape {} chart title", block),
        }
    }
}

/// One non-empty text span to translate, with its location and template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub location: ContentBlockRef,
    pub template: RichTextTemplate,
    /// Container text with surrounding whitespace trimmed.
    pub original_text: String,
    /// Empty until the translation phase fills it in.
    pub translated_text: String,
}

impl TranslationUnit {
    pub fn new(location: ContentBlockRef, template: RichTextTemplate) -> Self {
        let original_text = template.original_text.trim().to_string();
        Self {
            location,
            template,
            original_text,
            translated_text: String::new(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.location.kind()
    }
}

/// How a container was rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reconstruction {
    /// Rebuilt paragraph by paragraph from the captured template.
    Templated,
    /// The template path failed; the raw text was written without formatting.
    PlainText,
    /// Neither path could write the text.
    Failed,
}

impl Reconstruction {
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Result of processing one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideOutcome {
    /// 1-based slide number.
    pub number: usize,
    /// Units located on the slide.
    pub units: usize,
    /// Blocks that could not be inspected.
    pub locate_failures: usize,
    /// Units whose text came back untranslated.
    pub passed_through: usize,
    /// Units written back using their template.
    pub templated: usize,
    /// Units written back through the plain-text fallback.
    pub plain_text: usize,
    /// Units that could not be written back at all.
    pub failed: usize,
}

impl SlideOutcome {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            ..Default::default()
        }
    }

    pub fn applied(&self) -> usize {
        self.templated + self.plain_text
    }

    /// A slide with nothing to translate counts as a success.
    pub fn is_success(&self) -> bool {
        self.units == 0 || self.applied() > 0
    }
}

/// Aggregated result of a whole translation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub slides: Vec<SlideOutcome>,
}

impl RunSummary {
    pub fn slides_succeeded(&self) -> usize {
        self.slides.iter().filter(|s| s.is_success()).count()
    }

    pub fn slides_failed(&self) -> usize {
        self.slides.len() - self.slides_succeeded()
    }

    pub fn units_succeeded(&self) -> usize {
        self.slides.iter().map(SlideOutcome::applied).sum()
    }

    pub fn units_failed(&self) -> usize {
        self.slides.iter().map(|s| s.units - s.applied()).sum()
    }

    pub fn units_passed_through(&self) -> usize {
        self.slides.iter().map(|s| s.passed_through).sum()
    }

    /// The run succeeded if at least one slide did.
    pub fn succeeded(&self) -> bool {
        self.slides_succeeded() > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Slides: {} succeeded, {} failed",
            self.slides_succeeded(),
            self.slides_failed()
        )?;
        write!(
            f,
            "Text units: {} succeeded, {} failed ({} left untranslated)",
            self.units_succeeded(),
            self.units_failed(),
            self.units_passed_through()
        )
    }
}
