//! Slides and the chart parts they reference.

use crate::container::{ContainerKind, TextContainer, TextContainerMut};
use crate::dom::{Element, XmlDocument};
use deck_core::{ContentBlockRef, Error, Result};
use std::collections::HashMap;

/// Element names that count as shapes in a shape tree.
const SHAPE_ELEMENTS: &[&str] = &["sp", "grpSp", "graphicFrame", "cxnSp", "pic", "contentPart"];

/// Whether an element is a shape (as opposed to group or tree properties).
pub fn is_shape(el: &Element) -> bool {
    SHAPE_ELEMENTS.contains(&el.local_name())
}

/// A chart part referenced from a slide.
#[derive(Debug, Clone)]
pub struct ChartPart {
    path: String,
    document: XmlDocument,
    dirty: bool,
}

impl ChartPart {
    pub fn new(path: String, document: XmlDocument) -> Self {
        Self {
            path,
            document,
            dirty: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The `c:title` element, if the chart has one.
    pub fn title(&self) -> Option<&Element> {
        self.document.root.find(&["chart", "title"])
    }

    fn title_mut(&mut self) -> Option<&mut Element> {
        self.document.root.find_mut(&["chart", "title"])
    }
}

/// One slide of a presentation.
#[derive(Debug, Clone)]
pub struct Slide {
    number: usize,
    path: String,
    document: XmlDocument,
    /// Chart parts keyed by relationship id.
    charts: HashMap<String, ChartPart>,
    dirty: bool,
}

impl Slide {
    pub fn new(
        number: usize,
        path: String,
        document: XmlDocument,
        charts: HashMap<String, ChartPart>,
    ) -> Self {
        Self {
            number,
            path,
            document,
            charts,
            dirty: false,
        }
    }

    /// 1-based position in the presentation.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartPart> {
        self.charts.values()
    }

    /// Top-level shapes in document order.
    pub fn blocks(&self) -> Vec<&Element> {
        self.document
            .root
            .find(&["cSld", "spTree"])
            .map(|tree| tree.elements().filter(|e| is_shape(e)).collect())
            .unwrap_or_default()
    }

    /// The chart part a graphic frame points at.
    pub fn chart_for_frame(&self, frame: &Element) -> Result<&ChartPart> {
        let rel_id = chart_rel_id(frame)?;
        self.charts
            .get(rel_id)
            .ok_or_else(|| Error::ContentNotFound(format!("chart part for {}", rel_id)))
    }

    /// Read access to the container a unit was located in.
    pub fn container(&self, location: &ContentBlockRef) -> Result<TextContainer<'_>> {
        let kind = ContainerKind::for_element(location.kind());
        let block = *self
            .blocks()
            .get(location.block())
            .ok_or_else(|| not_found(location))?;

        let host = match *location {
            ContentBlockRef::Plain { .. } => Some(block),
            ContentBlockRef::Grouped { child, .. } => {
                block.elements().filter(|e| is_shape(e)).nth(child)
            }
            ContentBlockRef::TableCell { row, col, .. } => table_cell(block, row, col),
            ContentBlockRef::ChartTitle { .. } => self.chart_for_frame(block)?.title(),
        };
        host.map(|host| TextContainer::new(host, kind))
            .ok_or_else(|| not_found(location))
    }

    /// Write access to the container a unit was located in.
    ///
    /// Marks the part holding the container as modified.
    pub fn container_mut(&mut self, location: &ContentBlockRef) -> Result<TextContainerMut<'_>> {
        let kind = ContainerKind::for_element(location.kind());

        if let ContentBlockRef::ChartTitle { block } = *location {
            let rel_id = {
                let frame = *self.blocks().get(block).ok_or_else(|| not_found(location))?;
                chart_rel_id(frame)?.to_string()
            };
            let chart = self
                .charts
                .get_mut(&rel_id)
                .ok_or_else(|| Error::ContentNotFound(format!("chart part for {}", rel_id)))?;
            if chart.title().is_none() {
                return Err(not_found(location));
            }
            chart.dirty = true;
            let host = chart.title_mut().ok_or_else(|| not_found(location))?;
            return Ok(TextContainerMut::new(host, kind));
        }

        let tree = self
            .document
            .root
            .find_mut(&["cSld", "spTree"])
            .ok_or_else(|| not_found(location))?;
        let block = tree
            .elements_mut()
            .filter(|e| is_shape(e))
            .nth(location.block())
            .ok_or_else(|| not_found(location))?;

        let host = match *location {
            ContentBlockRef::Plain { .. } => Some(block),
            ContentBlockRef::Grouped { child, .. } => {
                block.elements_mut().filter(|e| is_shape(e)).nth(child)
            }
            ContentBlockRef::TableCell { row, col, .. } => table_cell_mut(block, row, col),
            ContentBlockRef::ChartTitle { .. } => None,
        };
        let host = host.ok_or_else(|| not_found(location))?;
        self.dirty = true;
        Ok(TextContainerMut::new(host, kind))
    }
}

fn not_found(location: &ContentBlockRef) -> Error {
    Error::ContentNotFound(location.to_string())
}

/// The `a:tbl` inside a graphic frame, if the frame holds a table.
pub fn frame_table(frame: &Element) -> Option<&Element> {
    frame.find(&["graphic", "graphicData", "tbl"])
}

/// The `c:chart` reference inside a graphic frame, if the frame holds a chart.
pub fn frame_chart_ref(frame: &Element) -> Option<&Element> {
    frame.find(&["graphic", "graphicData", "chart"])
}

fn chart_rel_id(frame: &Element) -> Result<&str> {
    frame_chart_ref(frame)
        .ok_or_else(|| Error::ContentNotFound("graphic frame holds no chart".to_string()))?
        .prefixed_attr("id")
        .ok_or_else(|| Error::ContentNotFound("chart reference has no relationship id".to_string()))
}

fn table_cell(frame: &Element, row: usize, col: usize) -> Option<&Element> {
    frame_table(frame)?
        .children_named("tr")
        .nth(row)?
        .children_named("tc")
        .nth(col)
}

fn table_cell_mut(frame: &mut Element, row: usize, col: usize) -> Option<&mut Element> {
    frame
        .find_mut(&["graphic", "graphicData", "tbl"])?
        .elements_mut()
        .filter(|e| e.is("tr"))
        .nth(row)?
        .elements_mut()
        .filter(|e| e.is("tc"))
        .nth(col)
}
