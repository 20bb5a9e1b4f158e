//! Content location: walks a slide's shapes and yields translatable units.

use crate::container::{ContainerKind, TextContainer};
use crate::extract::extract_template;
use crate::slide::{frame_chart_ref, frame_table, is_shape, Slide};
use deck_core::{ContentBlockRef, Result, TranslationUnit};

/// Units found on one slide, plus how many blocks could not be inspected.
#[derive(Debug, Default)]
pub struct LocateOutcome {
    pub units: Vec<TranslationUnit>,
    pub failures: usize,
}

/// Collect every non-empty text container on `slide`, in document order.
///
/// A block that fails to process is logged and skipped; later blocks are
/// still visited.
pub fn locate_units(slide: &Slide) -> LocateOutcome {
    let mut outcome = LocateOutcome::default();

    for (block, element) in slide.blocks().into_iter().enumerate() {
        match locate_block(slide, block, element) {
            Ok(units) => outcome.units.extend(units),
            Err(e) => {
                log::warn!("Slide {}: shape {} skipped: {}", slide.number(), block, e);
                outcome.failures += 1;
            }
        }
    }

    outcome
}

fn locate_block(
    slide: &Slide,
    block: usize,
    element: &crate::dom::Element,
) -> Result<Vec<TranslationUnit>> {
    let mut units = Vec::new();

    match element.local_name() {
        "sp" => {
            let container = TextContainer::new(element, ContainerKind::Shape);
            push_if_text(&mut units, ContentBlockRef::Plain { block }, container);
        }
        "grpSp" => {
            // Only immediate children; nested groups are not descended into.
            for (child, shape) in element.elements().filter(|e| is_shape(e)).enumerate() {
                if shape.is("sp") {
                    let container = TextContainer::new(shape, ContainerKind::Shape);
                    push_if_text(&mut units, ContentBlockRef::Grouped { block, child }, container);
                }
            }
        }
        "graphicFrame" => {
            if let Some(table) = frame_table(element) {
                for (row, tr) in table.children_named("tr").enumerate() {
                    for (col, tc) in tr.children_named("tc").enumerate() {
                        let container = TextContainer::new(tc, ContainerKind::TableCell);
                        push_if_text(
                            &mut units,
                            ContentBlockRef::TableCell { block, row, col },
                            container,
                        );
                    }
                }
            } else if frame_chart_ref(element).is_some() {
                let chart = slide.chart_for_frame(element)?;
                if let Some(title) = chart.title() {
                    let container = TextContainer::new(title, ContainerKind::ChartTitle);
                    push_if_text(&mut units, ContentBlockRef::ChartTitle { block }, container);
                }
            }
        }
        _ => {}
    }

    Ok(units)
}

fn push_if_text(
    units: &mut Vec<TranslationUnit>,
    location: ContentBlockRef,
    container: TextContainer<'_>,
) {
    if !container.capabilities().text_body || container.text().trim().is_empty() {
        return;
    }
    let unit = TranslationUnit::new(location, extract_template(&container));
    log::debug!(
        "Found {} text at {}: '{}'",
        location.kind().as_str(),
        location,
        preview(&unit.original_text)
    );
    units.push(unit);
}

/// First 30 characters of `text`, for log lines.
pub fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(30).collect();
    if text.chars().nth(30).is_some() {
        out.push_str("...");
    }
    out.replace('\n', " / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XmlDocument;
    use crate::fixtures;
    use crate::slide::ChartPart;
    use deck_core::ElementKind;
    use std::collections::HashMap;

    fn slide_from(xml: &str) -> Slide {
        Slide::new(
            1,
            "ppt/slides/slide1.xml".to_string(),
            XmlDocument::parse(xml).unwrap(),
            HashMap::new(),
        )
    }

    #[test]
    fn test_plain_shapes_in_order_skipping_blank() {
        let slide = slide_from(&fixtures::slide(&[
            fixtures::text_shape("Title"),
            fixtures::text_shape("   "),
            fixtures::empty_shape(),
            fixtures::picture(),
            fixtures::text_shape("Body\nSecond line"),
        ]));

        let outcome = locate_units(&slide);

        assert_eq!(outcome.failures, 0);
        let found: Vec<(ContentBlockRef, &str)> = outcome
            .units
            .iter()
            .map(|u| (u.location, u.original_text.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                (ContentBlockRef::Plain { block: 0 }, "Title"),
                (ContentBlockRef::Plain { block: 4 }, "Body\nSecond line"),
            ]
        );
        assert_eq!(outcome.units[1].template.paragraphs.len(), 2);
    }

    #[test]
    fn test_group_children_one_level_only() {
        let slide = slide_from(&fixtures::slide(&[fixtures::group(&[
            fixtures::text_shape("Left"),
            fixtures::group(&[fixtures::text_shape("Too deep")]),
            fixtures::text_shape(""),
            fixtures::text_shape("Right"),
        ])]));

        let outcome = locate_units(&slide);
        let locations: Vec<ContentBlockRef> = outcome.units.iter().map(|u| u.location).collect();

        assert_eq!(
            locations,
            vec![
                ContentBlockRef::Grouped { block: 0, child: 0 },
                ContentBlockRef::Grouped { block: 0, child: 3 },
            ]
        );
        assert!(outcome.units.iter().all(|u| u.kind() == ElementKind::Grouped));
    }

    #[test]
    fn test_table_cells_row_major() {
        let slide = slide_from(&fixtures::slide(&[fixtures::table(&[
            &["r0c0", "r0c1", "r0c2"],
            &["r1c0", "", "r1c2"],
        ])]));

        let outcome = locate_units(&slide);
        let cells: Vec<((usize, usize), &str)> = outcome
            .units
            .iter()
            .map(|u| (u.location.cell().unwrap(), u.original_text.as_str()))
            .collect();

        assert_eq!(
            cells,
            vec![
                ((0, 0), "r0c0"),
                ((0, 1), "r0c1"),
                ((0, 2), "r0c2"),
                ((1, 0), "r1c0"),
                ((1, 2), "r1c2"),
            ]
        );
    }

    #[test]
    fn test_chart_title() {
        let mut charts = HashMap::new();
        charts.insert(
            "rId2".to_string(),
            ChartPart::new(
                "ppt/charts/chart1.xml".to_string(),
                XmlDocument::parse(&fixtures::chart_part(Some("Revenue by region"))).unwrap(),
            ),
        );
        let slide = Slide::new(
            1,
            "ppt/slides/slide1.xml".to_string(),
            XmlDocument::parse(&fixtures::slide(&[fixtures::chart_frame("rId2")])).unwrap(),
            charts,
        );

        let outcome = locate_units(&slide);

        assert_eq!(outcome.units.len(), 1);
        assert_eq!(outcome.units[0].location, ContentBlockRef::ChartTitle { block: 0 });
        assert_eq!(outcome.units[0].original_text, "Revenue by region");
    }

    #[test]
    fn test_failed_block_does_not_stop_walk() {
        // The chart relationship is missing, so block 0 fails.
        let slide = slide_from(&fixtures::slide(&[
            fixtures::chart_frame("rId9"),
            fixtures::text_shape("Still found"),
        ]));

        let outcome = locate_units(&slide);

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.units.len(), 1);
        assert_eq!(outcome.units[0].location, ContentBlockRef::Plain { block: 1 });
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview(&"x".repeat(40)), format!("{}...", "x".repeat(30)));
        assert_eq!(preview("a\nb"), "a / b");
    }
}
