//! Formatting templates captured from rich text containers.
//!
//! A template records *how* a container's text looked, independently of
//! *what* it said. Every field is nullable: `None` means the attribute was not
//! explicitly set (or could not be read) and is left to inheritance when the
//! template is applied again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGB color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse a six-digit hex color such as `FF0000`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::from_u32(value))
    }

    /// Split a packed `0xRRGGBB` value into its channels.
    pub fn from_u32(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distributed,
    JustifyLow,
    ThaiDistributed,
}

impl Alignment {
    /// Parse a DrawingML `algn` value.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "l" => Some(Self::Left),
            "ctr" => Some(Self::Center),
            "r" => Some(Self::Right),
            "just" => Some(Self::Justify),
            "dist" => Some(Self::Distributed),
            "justLow" => Some(Self::JustifyLow),
            "thaiDist" => Some(Self::ThaiDistributed),
            _ => None,
        }
    }

    pub fn as_ooxml(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
            Self::Distributed => "dist",
            Self::JustifyLow => "justLow",
            Self::ThaiDistributed => "thaiDist",
        }
    }
}

/// Paragraph line spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineSpacing {
    /// A multiple of single spacing, e.g. `1.5`.
    Multiple(f64),
    /// A fixed distance in points.
    Points(f64),
}

/// How a text container resizes relative to its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoSize {
    /// Neither shape nor text is resized.
    None,
    /// The shape grows to fit its text.
    ShapeToFitText,
    /// The text shrinks to fit the shape.
    TextToFitShape,
}

/// Formatting of a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunTemplate {
    pub font_name: Option<String>,
    /// Size in points.
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<Rgb>,
    /// Character count of the original run. Only a weighting hint.
    pub text_length: usize,
}

impl RunTemplate {
    /// True when no formatting attribute is set.
    pub fn is_unformatted(&self) -> bool {
        self.font_name.is_none()
            && self.font_size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.color.is_none()
    }
}

/// Formatting of a paragraph and its runs, in visual order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphTemplate {
    pub alignment: Option<Alignment>,
    /// Indent level, `0` for the outermost.
    pub level: u8,
    /// Points.
    pub space_before: Option<f64>,
    /// Points.
    pub space_after: Option<f64>,
    pub line_spacing: Option<LineSpacing>,
    pub runs: Vec<RunTemplate>,
}

/// The four inner margins of a text container, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

/// Everything captured from one rich text container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichTextTemplate {
    /// The container's text at capture time, paragraphs joined by `\n`.
    pub original_text: String,
    /// One entry per paragraph at capture time.
    pub paragraphs: Vec<ParagraphTemplate>,
    pub margins: Margins,
    pub word_wrap: Option<bool>,
    pub auto_size: Option<AutoSize>,
}

impl RichTextTemplate {
    /// Template for the paragraph that will hold line `index` of the new text.
    ///
    /// Falls back to the first paragraph's template when the new text has more
    /// lines than the original had paragraphs, and to an empty template when
    /// nothing was captured at all.
    pub fn paragraph_for_line(&self, index: usize) -> ParagraphTemplate {
        self.paragraphs
            .get(index)
            .or_else(|| self.paragraphs.first())
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("FF0000"), Some(Rgb(255, 0, 0)));
        assert_eq!(Rgb::from_hex("00ff7f"), Some(Rgb(0, 255, 127)));
        assert_eq!(Rgb::from_hex("#102030"), Some(Rgb(16, 32, 48)));
        assert_eq!(Rgb::from_hex("F00"), None);
        assert_eq!(Rgb::from_hex("GGGGGG"), None);
    }

    #[test]
    fn test_rgb_packed_and_hex() {
        assert_eq!(Rgb::from_u32(0x336699), Rgb(0x33, 0x66, 0x99));
        assert_eq!(Rgb(255, 0, 10).to_hex(), "FF000A");
    }

    #[test]
    fn test_alignment_codes() {
        for code in ["l", "ctr", "r", "just", "dist", "justLow", "thaiDist"] {
            let alignment = Alignment::from_ooxml(code).unwrap();
            assert_eq!(alignment.as_ooxml(), code);
        }
        assert_eq!(Alignment::from_ooxml("middle"), None);
    }

    #[test]
    fn test_paragraph_for_line_fallbacks() {
        let first = ParagraphTemplate {
            level: 1,
            ..Default::default()
        };
        let second = ParagraphTemplate {
            level: 2,
            ..Default::default()
        };
        let template = RichTextTemplate {
            paragraphs: vec![first.clone(), second.clone()],
            ..Default::default()
        };

        assert_eq!(template.paragraph_for_line(1), second);
        assert_eq!(template.paragraph_for_line(5), first);
        assert_eq!(
            RichTextTemplate::default().paragraph_for_line(0),
            ParagraphTemplate::default()
        );
    }
}
