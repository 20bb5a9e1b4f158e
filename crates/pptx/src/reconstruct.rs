//! Template reconstruction: writes translated text back into a container,
//! stamping the captured formatting onto the new paragraphs and runs.

use crate::container::{TextContainer, TextContainerMut, LINE_BREAK};
use crate::dom::{qualified, Element, Node};
use crate::extract::EMU_PER_POINT;
use deck_core::{
    distribute, AutoSize, Error, LineSpacing, ParagraphTemplate, Reconstruction, Result,
    RichTextTemplate, RunTemplate,
};

/// Child order of `a:pPr`.
const PARAGRAPH_PROPERTY_ORDER: &[&str] = &[
    "lnSpc", "spcBef", "spcAft", "buClrTx", "buClr", "buSzTx", "buSzPct", "buSzPts", "buFontTx",
    "buFont", "buNone", "buAutoNum", "buChar", "buBlip", "tabLst", "defRPr", "extLst",
];

/// Child order of `a:bodyPr`. The three autofit kinds share one slot.
const BODY_PROPERTY_ORDER: &[&str] = &[
    "prstTxWarp", "noAutofit", "normAutofit", "spAutoFit", "scene3d", "sp3d", "flatTx", "extLst",
];

const AUTOFIT_ELEMENTS: &[&str] = &["noAutofit", "normAutofit", "spAutoFit"];

/// Rewrite `container` to hold `text`, formatted after `template`.
///
/// Falls back to unformatted text when the templated rebuild fails; the
/// container is only touched once a complete set of paragraphs is ready.
pub fn reconstruct(
    container: &mut TextContainerMut<'_>,
    template: &RichTextTemplate,
    text: &str,
) -> Reconstruction {
    restore_frame(container, template);

    let paragraphs = build_paragraphs(&container.as_view(), template, text);
    let rebuilt = paragraphs.and_then(|paragraphs| container.replace_paragraphs(paragraphs));
    let Err(e) = rebuilt else {
        return Reconstruction::Templated;
    };

    log::warn!("Template reconstruction failed, writing plain text: {}", e);
    match write_plain_text(container, text) {
        Ok(()) => Reconstruction::PlainText,
        Err(e) => {
            log::error!("Plain text fallback failed: {}", e);
            Reconstruction::Failed
        }
    }
}

/// Re-apply margins, word wrap and auto-size. Each attribute is restored on
/// its own; a missing holder only skips that attribute.
fn restore_frame(container: &mut TextContainerMut<'_>, template: &RichTextTemplate) {
    let caps = container.capabilities();
    let margins = template.margins;
    let values = [margins.left, margins.right, margins.top, margins.bottom];

    if values.iter().any(Option::is_some) {
        match container.margin_holder_mut() {
            Some(holder) => {
                for (name, value) in caps.margins.attributes().into_iter().zip(values) {
                    if let Some(points) = value {
                        holder.set_attr(name, emu(points));
                    }
                }
            }
            None => log::debug!("No margin holder, margins not restored"),
        }
    }

    if let (true, Some(wrap)) = (caps.word_wrap, template.word_wrap) {
        match container.body_properties_mut() {
            Some(body_pr) => body_pr.set_attr("wrap", if wrap { "square" } else { "none" }),
            None => log::debug!("No body properties, word wrap not restored"),
        }
    }

    if let (true, Some(mode)) = (caps.auto_size, template.auto_size) {
        match container.body_properties_mut() {
            Some(body_pr) => set_auto_size(body_pr, mode),
            None => log::debug!("No body properties, auto-size not restored"),
        }
    }
}

fn set_auto_size(body_pr: &mut Element, mode: AutoSize) {
    let local = match mode {
        AutoSize::None => "noAutofit",
        AutoSize::ShapeToFitText => "spAutoFit",
        AutoSize::TextToFitShape => "normAutofit",
    };
    // Keep an existing element of the same kind; normAutofit carries scale data.
    if body_pr.child(local).is_some() {
        return;
    }
    for other in AUTOFIT_ELEMENTS {
        body_pr.remove_children(other);
    }
    let name = qualified(body_pr.prefix(), local);
    body_pr.set_ordered_child(Element::new(name), BODY_PROPERTY_ORDER);
}

/// Build the replacement paragraphs without touching the container.
fn build_paragraphs(
    view: &TextContainer<'_>,
    template: &RichTextTemplate,
    text: &str,
) -> Result<Vec<Element>> {
    let anchor = anchor_paragraph(view);
    let prefix = anchor.prefix().map(str::to_string);
    let prefix = prefix.as_deref();

    let mut paragraphs = Vec::new();
    for (index, line) in split_lines(text).enumerate() {
        if index > 0 && line.trim().is_empty() {
            continue;
        }
        validate_xml_text(line)?;

        let paragraph_template = template.paragraph_for_line(index);
        let mut paragraph = if index == 0 {
            anchor.clone()
        } else {
            Element::new(qualified(prefix, "p"))
        };
        apply_paragraph_format(&mut paragraph, &paragraph_template);

        if !line.is_empty() {
            for segment in distribute(line, &paragraph_template.runs) {
                let rpr = run_properties(&segment.template, prefix);
                push_text(&mut paragraph, &segment.text, rpr.as_ref(), prefix);
            }
        }
        paragraphs.push(paragraph);
    }

    Ok(paragraphs)
}

/// Replace the container's text with unformatted paragraphs, one per line.
///
/// Characters XML cannot carry are dropped.
pub fn write_plain_text(container: &mut TextContainerMut<'_>, text: &str) -> Result<()> {
    let anchor = anchor_paragraph(&container.as_view());
    let prefix = anchor.prefix().map(str::to_string);

    let paragraphs = split_lines(text)
        .map(|line| {
            let mut paragraph = anchor.clone();
            push_text(&mut paragraph, &sanitize(line), None, prefix.as_deref());
            paragraph
        })
        .collect();
    container.replace_paragraphs(paragraphs)
}

fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// The first existing paragraph with its content removed, or a fresh one.
///
/// Paragraph properties and `a:endParaRPr` are kept.
fn anchor_paragraph(view: &TextContainer<'_>) -> Element {
    if let Some(first) = view.paragraphs().next() {
        let mut anchor = first.clone();
        for content in ["r", "br", "fld"] {
            anchor.remove_children(content);
        }
        return anchor;
    }
    let prefix = view.body_properties().and_then(Element::prefix).unwrap_or("a");
    Element::new(qualified(Some(prefix), "p"))
}

fn apply_paragraph_format(paragraph: &mut Element, template: &ParagraphTemplate) {
    let has_format = template.alignment.is_some()
        || template.level > 0
        || template.space_before.is_some()
        || template.space_after.is_some()
        || template.line_spacing.is_some();
    if !has_format && paragraph.child("pPr").is_none() {
        return;
    }

    let prefix = paragraph.prefix().map(str::to_string);
    let prefix = prefix.as_deref();
    if paragraph.child("pPr").is_none() {
        paragraph
            .children
            .insert(0, Node::Element(Element::new(qualified(prefix, "pPr"))));
    }
    let Some(ppr) = paragraph.child_mut("pPr") else {
        return;
    };

    if let Some(alignment) = template.alignment {
        ppr.set_attr("algn", alignment.as_ooxml());
    }
    if template.level > 0 {
        ppr.set_attr("lvl", template.level.to_string());
    } else {
        ppr.remove_attr("lvl");
    }

    if let Some(spacing) = template.line_spacing {
        let value = match spacing {
            LineSpacing::Multiple(multiple) => Element::new(qualified(prefix, "spcPct"))
                .with_attr("val", ((multiple * 100_000.0).round() as i64).to_string()),
            LineSpacing::Points(points) => points_element(prefix, points),
        };
        ppr.set_ordered_child(
            Element::new(qualified(prefix, "lnSpc")).with_child(value),
            PARAGRAPH_PROPERTY_ORDER,
        );
    }
    for (local, value) in [
        ("spcBef", template.space_before),
        ("spcAft", template.space_after),
    ] {
        if let Some(points) = value {
            ppr.set_ordered_child(
                Element::new(qualified(prefix, local)).with_child(points_element(prefix, points)),
                PARAGRAPH_PROPERTY_ORDER,
            );
        }
    }
}

fn points_element(prefix: Option<&str>, points: f64) -> Element {
    Element::new(qualified(prefix, "spcPts"))
        .with_attr("val", ((points * 100.0).round() as i64).to_string())
}

/// `a:rPr` for a run template, or `None` when it sets nothing.
fn run_properties(template: &RunTemplate, prefix: Option<&str>) -> Option<Element> {
    if template.is_unformatted() {
        return None;
    }
    let flag = |value: bool| if value { "1" } else { "0" };

    let mut rpr = Element::new(qualified(prefix, "rPr"));
    if let Some(size) = template.font_size {
        rpr.set_attr("sz", ((size * 100.0).round() as i64).to_string());
    }
    if let Some(bold) = template.bold {
        rpr.set_attr("b", flag(bold));
    }
    if let Some(italic) = template.italic {
        rpr.set_attr("i", flag(italic));
    }
    if let Some(underline) = template.underline {
        rpr.set_attr("u", if underline { "sng" } else { "none" });
    }
    if let Some(color) = template.color {
        rpr = rpr.with_child(
            Element::new(qualified(prefix, "solidFill")).with_child(
                Element::new(qualified(prefix, "srgbClr")).with_attr("val", color.to_hex()),
            ),
        );
    }
    if let Some(font) = &template.font_name {
        rpr = rpr.with_child(Element::new(qualified(prefix, "latin")).with_attr("typeface", font));
    }
    Some(rpr)
}

/// Append `text` to `paragraph` as runs, turning line-break characters into
/// `a:br`. New content goes before `a:endParaRPr`.
fn push_text(paragraph: &mut Element, text: &str, rpr: Option<&Element>, prefix: Option<&str>) {
    let mut nodes = Vec::new();
    for (i, piece) in text.split(LINE_BREAK).enumerate() {
        if i > 0 {
            let mut br = Element::new(qualified(prefix, "br"));
            if let Some(rpr) = rpr {
                br = br.with_child(rpr.clone());
            }
            nodes.push(Node::Element(br));
        }
        if piece.is_empty() {
            continue;
        }
        let mut run = Element::new(qualified(prefix, "r"));
        if let Some(rpr) = rpr {
            run = run.with_child(rpr.clone());
        }
        run = run.with_child(Element::new(qualified(prefix, "t")).with_text(piece));
        nodes.push(Node::Element(run));
    }

    let at = paragraph
        .children
        .iter()
        .position(|node| matches!(node, Node::Element(e) if e.is("endParaRPr")))
        .unwrap_or(paragraph.children.len());
    paragraph.children.splice(at..at, nodes);
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | LINE_BREAK)
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

fn validate_xml_text(text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        Some(c) => Err(Error::Reconstruction(format!(
            "character U+{:04X} cannot be stored in XML",
            c as u32
        ))),
        None => Ok(()),
    }
}

fn sanitize(text: &str) -> String {
    text.chars().filter(|c| is_xml_char(*c)).collect()
}

fn emu(points: f64) -> String {
    ((points * EMU_PER_POINT).round() as i64).to_string()
}
