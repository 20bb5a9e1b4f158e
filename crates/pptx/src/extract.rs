//! Template extraction.
//!
//! Every attribute is read on its own. Absent attributes are simply `None`;
//! a present but unreadable one (a malformed number, a theme color with no
//! explicit RGB) is logged and also recorded as `None`, so one bad value never
//! costs the rest of the template.

use crate::container::TextContainer;
use crate::dom::Element;
use deck_core::{
    Alignment, AttributeError, AutoSize, LineSpacing, Margins, ParagraphTemplate, Rgb,
    RichTextTemplate, RunTemplate,
};

/// English Metric Units per point.
pub const EMU_PER_POINT: f64 = 12_700.0;

type AttrResult<T> = std::result::Result<Option<T>, AttributeError>;

/// Capture the formatting template of a container.
pub fn extract_template(container: &TextContainer<'_>) -> RichTextTemplate {
    let caps = container.capabilities();

    let paragraphs = container.paragraphs().map(extract_paragraph).collect();
    let margins = container
        .margin_holder()
        .map(|holder| {
            let [left, right, top, bottom] = caps.margins.attributes();
            Margins {
                left: capture(read_emu_points(holder, left, "frame.margin_left")),
                right: capture(read_emu_points(holder, right, "frame.margin_right")),
                top: capture(read_emu_points(holder, top, "frame.margin_top")),
                bottom: capture(read_emu_points(holder, bottom, "frame.margin_bottom")),
            }
        })
        .unwrap_or_default();

    let body_pr = container.body_properties();
    let word_wrap = match body_pr {
        Some(body_pr) if caps.word_wrap => capture(read_word_wrap(body_pr)),
        _ => None,
    };
    let auto_size = match body_pr {
        Some(body_pr) if caps.auto_size => capture(read_auto_size(body_pr)),
        _ => None,
    };

    RichTextTemplate {
        original_text: container.text(),
        paragraphs,
        margins,
        word_wrap,
        auto_size,
    }
}

/// Capture one `a:p`.
pub fn extract_paragraph(paragraph: &Element) -> ParagraphTemplate {
    let runs = paragraph.children_named("r").map(extract_run).collect();

    let Some(ppr) = paragraph.child("pPr") else {
        return ParagraphTemplate {
            runs,
            ..Default::default()
        };
    };

    ParagraphTemplate {
        alignment: capture(read_alignment(ppr)),
        level: capture(read_level(ppr)).unwrap_or(0),
        space_before: capture(read_spacing(ppr, "spcBef", "paragraph.space_before")),
        space_after: capture(read_spacing(ppr, "spcAft", "paragraph.space_after")),
        line_spacing: capture(read_line_spacing(ppr)),
        runs,
    }
}

/// Capture one `a:r`.
pub fn extract_run(run: &Element) -> RunTemplate {
    let text_length = run
        .child("t")
        .map(|t| t.text().chars().count())
        .unwrap_or(0);

    let Some(rpr) = run.child("rPr") else {
        return RunTemplate {
            text_length,
            ..Default::default()
        };
    };

    RunTemplate {
        font_name: rpr
            .child("latin")
            .and_then(|latin| latin.attr("typeface"))
            .map(str::to_string),
        font_size: capture(read_hundredths(rpr, "sz", "run.font_size")),
        bold: capture(read_bool(rpr, "b", "run.bold")),
        italic: capture(read_bool(rpr, "i", "run.italic")),
        underline: capture(read_underline(rpr)),
        color: capture(read_color(rpr)),
        text_length,
    }
}

/// Turn a read result into a field value, logging failures.
fn capture<T>(read: AttrResult<T>) -> Option<T> {
    read.unwrap_or_else(|err| {
        log::log!(capture_level(&err), "Attribute left unset, {}", err);
        None
    })
}

/// Malformed values are reported; values that only resolve through the
/// theme are routine.
fn capture_level(err: &AttributeError) -> log::Level {
    if err.unresolved {
        log::Level::Debug
    } else {
        log::Level::Warn
    }
}

fn parse_number(
    el: &Element,
    attr: &str,
    attribute: &'static str,
) -> std::result::Result<Option<f64>, AttributeError> {
    el.attr(attr)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| AttributeError::new(attribute, format!("'{}' is not a number", raw)))
        })
        .transpose()
}

fn read_emu_points(el: &Element, attr: &str, attribute: &'static str) -> AttrResult<f64> {
    Ok(parse_number(el, attr, attribute)?.map(|emu| emu / EMU_PER_POINT))
}

fn read_hundredths(el: &Element, attr: &str, attribute: &'static str) -> AttrResult<f64> {
    Ok(parse_number(el, attr, attribute)?.map(|v| v / 100.0))
}

fn read_bool(el: &Element, attr: &str, attribute: &'static str) -> AttrResult<bool> {
    match el.attr(attr) {
        None => Ok(None),
        Some("1") | Some("true") | Some("on") => Ok(Some(true)),
        Some("0") | Some("false") | Some("off") => Ok(Some(false)),
        Some(other) => Err(AttributeError::new(
            attribute,
            format!("'{}' is not a boolean", other),
        )),
    }
}

fn read_underline(rpr: &Element) -> AttrResult<bool> {
    // Any underline style other than "none" counts as underlined.
    Ok(rpr.attr("u").map(|u| u != "none"))
}

fn read_word_wrap(body_pr: &Element) -> AttrResult<bool> {
    match body_pr.attr("wrap") {
        None => Ok(None),
        Some("square") => Ok(Some(true)),
        Some("none") => Ok(Some(false)),
        Some(other) => Err(AttributeError::new(
            "frame.word_wrap",
            format!("unknown wrap mode '{}'", other),
        )),
    }
}

fn read_auto_size(body_pr: &Element) -> AttrResult<AutoSize> {
    let mode = body_pr.elements().find_map(|e| match e.local_name() {
        "noAutofit" => Some(AutoSize::None),
        "spAutoFit" => Some(AutoSize::ShapeToFitText),
        "normAutofit" => Some(AutoSize::TextToFitShape),
        _ => None,
    });
    Ok(mode)
}

fn read_alignment(ppr: &Element) -> AttrResult<Alignment> {
    ppr.attr("algn")
        .map(|algn| {
            Alignment::from_ooxml(algn).ok_or_else(|| {
                AttributeError::new("paragraph.alignment", format!("unknown alignment '{}'", algn))
            })
        })
        .transpose()
}

fn read_level(ppr: &Element) -> AttrResult<u8> {
    ppr.attr("lvl")
        .map(|lvl| {
            lvl.parse::<u8>()
                .ok()
                .filter(|l| *l <= 8)
                .ok_or_else(|| AttributeError::new("paragraph.level", format!("bad level '{}'", lvl)))
        })
        .transpose()
}

fn read_spacing(ppr: &Element, local: &str, attribute: &'static str) -> AttrResult<f64> {
    let Some(spacing) = ppr.child(local) else {
        return Ok(None);
    };
    if let Some(points) = spacing.child("spcPts") {
        return read_hundredths(points, "val", attribute);
    }
    if spacing.child("spcPct").is_some() {
        return Err(AttributeError::unresolved(
            attribute,
            "percentage spacing has no point value",
        ));
    }
    Ok(None)
}

fn read_line_spacing(ppr: &Element) -> AttrResult<LineSpacing> {
    let Some(spacing) = ppr.child("lnSpc") else {
        return Ok(None);
    };
    if let Some(pct) = spacing.child("spcPct") {
        let value = read_percentage(pct, "paragraph.line_spacing")?;
        return Ok(value.map(LineSpacing::Multiple));
    }
    if let Some(points) = spacing.child("spcPts") {
        let value = read_hundredths(points, "val", "paragraph.line_spacing")?;
        return Ok(value.map(LineSpacing::Points));
    }
    Ok(None)
}

/// Read an `ST_Percentage` `val` as a fraction: `150000` or `"150%"` is 1.5.
fn read_percentage(el: &Element, attribute: &'static str) -> AttrResult<f64> {
    let Some(raw) = el.attr("val") else {
        return Ok(None);
    };
    let parsed = match raw.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().map(|v| v / 100.0),
        None => raw.trim().parse::<f64>().map(|v| v / 100_000.0),
    };
    parsed
        .map(Some)
        .map_err(|_| AttributeError::new(attribute, format!("'{}' is not a percentage", raw)))
}

/// Normalize the run's solid fill to an RGB triple.
fn read_color(rpr: &Element) -> AttrResult<Rgb> {
    let Some(fill) = rpr.child("solidFill") else {
        return Ok(None);
    };
    let Some(color) = fill.elements().next() else {
        return Ok(None);
    };
    color_to_rgb(color).map(Some)
}

/// Resolve a DrawingML color element to RGB. Color transforms (`lumMod`,
/// `alpha`, ...) are ignored.
pub fn color_to_rgb(color: &Element) -> std::result::Result<Rgb, AttributeError> {
    let bad = |reason: String| AttributeError::new("run.color", reason);

    match color.local_name() {
        "srgbClr" => {
            let val = color.attr("val").unwrap_or_default();
            Rgb::from_hex(val).ok_or_else(|| bad(format!("bad hex color '{}'", val)))
        }
        "sysClr" => {
            let last = color.attr("lastClr").unwrap_or_default();
            Rgb::from_hex(last).ok_or_else(|| {
                bad(format!(
                    "system color '{}' has no last computed value",
                    color.attr("val").unwrap_or_default()
                ))
            })
        }
        "scrgbClr" => {
            let channel = |name: &str| -> std::result::Result<u8, AttributeError> {
                let fraction = read_percentage_attr(color, name)
                    .ok_or_else(|| bad(format!("bad scRGB channel '{}'", name)))?;
                Ok((fraction.clamp(0.0, 1.0) * 255.0).round() as u8)
            };
            Ok(Rgb(channel("r")?, channel("g")?, channel("b")?))
        }
        "prstClr" => {
            let val = color.attr("val").unwrap_or_default();
            preset_color(val).ok_or_else(|| bad(format!("unknown preset color '{}'", val)))
        }
        "schemeClr" => Err(AttributeError::unresolved(
            "run.color",
            format!(
                "theme color '{}' has no explicit RGB",
                color.attr("val").unwrap_or_default()
            ),
        )),
        other => Err(bad(format!("unsupported color type '{}'", other))),
    }
}

fn read_percentage_attr(el: &Element, name: &str) -> Option<f64> {
    let raw = el.attr(name)?;
    match raw.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
        None => raw.trim().parse::<f64>().ok().map(|v| v / 100_000.0),
    }
}

fn preset_color(name: &str) -> Option<Rgb> {
    let packed = match name {
        "black" => 0x000000,
        "white" => 0xFFFFFF,
        "red" => 0xFF0000,
        "green" => 0x008000,
        "lime" => 0x00FF00,
        "blue" => 0x0000FF,
        "yellow" => 0xFFFF00,
        "cyan" | "aqua" => 0x00FFFF,
        "magenta" | "fuchsia" => 0xFF00FF,
        "gray" | "grey" => 0x808080,
        "silver" => 0xC0C0C0,
        "maroon" => 0x800000,
        "navy" => 0x000080,
        "olive" => 0x808000,
        "purple" => 0x800080,
        "teal" => 0x008080,
        "orange" => 0xFFA500,
        _ => return None,
    };
    Some(Rgb::from_u32(packed))
}
