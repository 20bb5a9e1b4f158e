//! Rich text containers: shape text bodies, table cells, and chart titles.
//!
//! The three container variants store the same DrawingML paragraphs but keep
//! their frame-level attributes in different places. A [`Capabilities`] probe
//! runs once per container so extraction and reconstruction never have to ask
//! "does this attribute exist here?" again.

use crate::dom::{Element, Node};
use deck_core::{ElementKind, Error, Result};

/// Character used for a line break (`a:br`) inside a paragraph's text.
pub const LINE_BREAK: char = '\u{b}';

/// Which kind of element hosts the text body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// `p:sp` with a `p:txBody`.
    Shape,
    /// `a:tc` with an `a:txBody` and cell properties in `a:tcPr`.
    TableCell,
    /// `c:title` with its text in `c:tx/c:rich`.
    ChartTitle,
}

impl ContainerKind {
    pub fn for_element(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Plain | ElementKind::Grouped => Self::Shape,
            ElementKind::TableCell => Self::TableCell,
            ElementKind::ChartTitle => Self::ChartTitle,
        }
    }

    fn body_path(self) -> &'static [&'static str] {
        match self {
            Self::Shape | Self::TableCell => &["txBody"],
            Self::ChartTitle => &["tx", "rich"],
        }
    }
}

/// Where a container's inner margins are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginSource {
    /// `lIns`/`rIns`/`tIns`/`bIns` on `a:bodyPr`.
    BodyInsets,
    /// `marL`/`marR`/`marT`/`marB` on `a:tcPr`.
    CellMargins,
}

impl MarginSource {
    /// Attribute names for left, right, top, bottom.
    pub fn attributes(self) -> [&'static str; 4] {
        match self {
            Self::BodyInsets => ["lIns", "rIns", "tIns", "bIns"],
            Self::CellMargins => ["marL", "marR", "marT", "marB"],
        }
    }
}

/// Which frame-level attributes a container structurally supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The host has a text body at all.
    pub text_body: bool,
    /// The text body has an `a:bodyPr` element.
    pub body_properties: bool,
    pub margins: MarginSource,
    pub word_wrap: bool,
    pub auto_size: bool,
}

impl Capabilities {
    pub fn probe(host: &Element, kind: ContainerKind) -> Self {
        let body = host.find(kind.body_path());
        let body_properties = body.and_then(|b| b.child("bodyPr")).is_some();

        match kind {
            ContainerKind::Shape => Self {
                text_body: body.is_some(),
                body_properties,
                margins: MarginSource::BodyInsets,
                word_wrap: true,
                auto_size: true,
            },
            ContainerKind::TableCell => Self {
                text_body: body.is_some(),
                body_properties,
                margins: MarginSource::CellMargins,
                word_wrap: false,
                auto_size: false,
            },
            ContainerKind::ChartTitle => Self {
                text_body: body.is_some(),
                body_properties,
                margins: MarginSource::BodyInsets,
                word_wrap: true,
                auto_size: false,
            },
        }
    }
}

/// Read access to a rich text container.
#[derive(Debug, Clone, Copy)]
pub struct TextContainer<'a> {
    host: &'a Element,
    kind: ContainerKind,
    caps: Capabilities,
}

impl<'a> TextContainer<'a> {
    pub fn new(host: &'a Element, kind: ContainerKind) -> Self {
        Self {
            host,
            kind,
            caps: Capabilities::probe(host, kind),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn body(&self) -> Option<&'a Element> {
        self.host.find(self.kind.body_path())
    }

    pub fn body_properties(&self) -> Option<&'a Element> {
        self.body().and_then(|b| b.child("bodyPr"))
    }

    /// The element holding margin attributes.
    pub fn margin_holder(&self) -> Option<&'a Element> {
        match self.caps.margins {
            MarginSource::BodyInsets => self.body_properties(),
            MarginSource::CellMargins => self.host.child("tcPr"),
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &'a Element> {
        self.body()
            .into_iter()
            .flat_map(|body| body.children_named("p"))
    }

    /// The container's text, paragraphs joined by `\n`.
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(paragraph_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Write access to a rich text container.
#[derive(Debug)]
pub struct TextContainerMut<'a> {
    host: &'a mut Element,
    kind: ContainerKind,
    caps: Capabilities,
}

impl<'a> TextContainerMut<'a> {
    pub fn new(host: &'a mut Element, kind: ContainerKind) -> Self {
        let caps = Capabilities::probe(host, kind);
        Self { host, kind, caps }
    }

    pub fn as_view(&self) -> TextContainer<'_> {
        TextContainer {
            host: &*self.host,
            kind: self.kind,
            caps: self.caps,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn body_mut(&mut self) -> Option<&mut Element> {
        self.host.find_mut(self.kind.body_path())
    }

    pub fn body_properties_mut(&mut self) -> Option<&mut Element> {
        self.body_mut().and_then(|b| b.child_mut("bodyPr"))
    }

    /// The element holding margin attributes, created for table cells
    /// that have no `a:tcPr` yet.
    pub fn margin_holder_mut(&mut self) -> Option<&mut Element> {
        match self.caps.margins {
            MarginSource::BodyInsets => self.body_properties_mut(),
            MarginSource::CellMargins => {
                if self.host.child("tcPr").is_none() {
                    let name = sibling_name(self.host, "tcPr");
                    self.host
                        .set_ordered_child(Element::new(name), &["txBody", "tcPr", "extLst"]);
                }
                self.host.child_mut("tcPr")
            }
        }
    }

    /// Swap the body's paragraphs for `paragraphs` in one step.
    ///
    /// The new paragraphs take the place of the first old one; `a:bodyPr`,
    /// `a:lstStyle` and anything after the paragraphs stay where they are.
    pub fn replace_paragraphs(&mut self, paragraphs: Vec<Element>) -> Result<()> {
        let body = self
            .body_mut()
            .ok_or_else(|| Error::Reconstruction("container has no text body".to_string()))?;

        let insert_at = body
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.is("p")))
            .unwrap_or_else(|| {
                body.children
                    .iter()
                    .rposition(|node| {
                        matches!(node, Node::Element(e) if e.is("bodyPr") || e.is("lstStyle"))
                    })
                    .map_or(0, |idx| idx + 1)
            });

        body.remove_children("p");
        let at = insert_at.min(body.children.len());
        body.children
            .splice(at..at, paragraphs.into_iter().map(Node::Element));
        Ok(())
    }
}

/// Text of one `a:p`: runs and fields contribute their `a:t`, line breaks
/// become [`LINE_BREAK`].
pub fn paragraph_text(paragraph: &Element) -> String {
    let mut text = String::new();
    for child in paragraph.elements() {
        match child.local_name() {
            "r" | "fld" => {
                if let Some(t) = child.child("t") {
                    text.push_str(&t.text());
                }
            }
            "br" => text.push(LINE_BREAK),
            _ => {}
        }
    }
    text
}

/// Name for a new child of `parent`, borrowing the prefix its own name uses.
fn sibling_name(parent: &Element, local: &str) -> String {
    crate::dom::qualified(parent.prefix(), local)
}
