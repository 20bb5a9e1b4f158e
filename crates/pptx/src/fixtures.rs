//! In-memory PPTX fixtures for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A complete slide part containing `shapes`.
pub fn slide(shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {NS}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        shapes.concat()
    )
}

/// A text box whose body is `paragraphs` (raw `a:p` XML).
pub fn shape_with_paragraphs(body_pr: &str, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody>{body_pr}<a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#
    )
}

/// A text box with one unformatted paragraph per line.
pub fn text_shape(text: &str) -> String {
    shape_with_paragraphs(r#"<a:bodyPr/>"#, &plain_paragraphs(text))
}

/// A shape without a text body.
pub fn empty_shape() -> String {
    r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Rect"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#
        .to_string()
}

pub fn picture() -> String {
    r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>"#
        .to_string()
}

pub fn group(children: &[String]) -> String {
    format!(
        r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="5" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:grpSp>"#,
        children.concat()
    )
}

/// A table frame; each cell holds its text as plain paragraphs.
pub fn table(rows: &[&[&str]]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells
                .iter()
                .map(|text| {
                    format!(
                        r#"<a:tc><a:txBody><a:bodyPr/><a:lstStyle/>{}</a:txBody><a:tcPr/></a:tc>"#,
                        plain_paragraphs(text)
                    )
                })
                .collect();
            format!(r#"<a:tr h="370840">{cells}</a:tr>"#)
        })
        .collect();
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="6" name="Table"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table"><a:tbl><a:tblPr/><a:tblGrid/>{rows}</a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

/// A chart frame pointing at relationship `rel_id`.
pub fn chart_frame(rel_id: &str) -> String {
    format!(
        r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="7" name="Chart"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{rel_id}"/></a:graphicData></a:graphic></p:graphicFrame>"#
    )
}

/// A chart part, with a rich-text title when `title` is given.
pub fn chart_part(title: Option<&str>) -> String {
    let title = title
        .map(|text| {
            format!(
                r#"<c:title><c:tx><c:rich><a:bodyPr/><a:lstStyle/>{}</c:rich></c:tx><c:overlay val="0"/></c:title>"#,
                plain_paragraphs(text)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><c:chart>{title}<c:autoTitleDeleted val="0"/><c:plotArea/></c:chart></c:chartSpace>"#
    )
}

fn plain_paragraphs(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                "<a:p/>".to_string()
            } else {
                format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(line))
            }
        })
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

struct FixtureSlide {
    xml: String,
    charts: Vec<(String, String)>,
}

/// Builds a minimal but structurally complete .pptx archive.
pub struct PackageBuilder {
    slides: Vec<FixtureSlide>,
    order: Option<Vec<usize>>,
    slide_list: bool,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            order: None,
            slide_list: true,
        }
    }

    pub fn slide(mut self, xml: &str) -> Self {
        self.slides.push(FixtureSlide {
            xml: xml.to_string(),
            charts: Vec::new(),
        });
        self
    }

    /// Add a slide whose relationship `rel_id` points at a chart part.
    pub fn slide_with_chart(mut self, xml: &str, rel_id: &str, chart_xml: &str) -> Self {
        self.slides.push(FixtureSlide {
            xml: xml.to_string(),
            charts: vec![(rel_id.to_string(), chart_xml.to_string())],
        });
        self
    }

    /// List slides in `p:sldIdLst` in this order (1-based slide file numbers).
    pub fn slide_list_order(mut self, order: &[usize]) -> Self {
        self.order = Some(order.to_vec());
        self
    }

    pub fn without_slide_list(mut self) -> Self {
        self.slide_list = false;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let mut add = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        add(
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/></Types>"#,
        );
        add(
            "_rels/.rels",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{REL_BASE}/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#
            ),
        );

        let order = self
            .order
            .clone()
            .unwrap_or_else(|| (1..=self.slides.len()).collect());
        let slide_ids: String = order
            .iter()
            .enumerate()
            .map(|(i, n)| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, n + 1))
            .collect();
        let slide_list = if self.slide_list {
            format!("<p:sldIdLst>{slide_ids}</p:sldIdLst>")
        } else {
            String::new()
        };
        add(
            "ppt/presentation.xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {NS}>{slide_list}<p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#
            ),
        );

        let mut rels = format!(
            r#"<Relationship Id="rId1" Type="{REL_BASE}/theme" Target="theme/theme1.xml"/>"#
        );
        for n in 1..=self.slides.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{REL_BASE}/slide" Target="slides/slide{}.xml"/>"#,
                n + 1,
                n
            ));
        }
        add(
            "ppt/_rels/presentation.xml.rels",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{REL_NS}">{rels}</Relationships>"#
            ),
        );

        let mut chart_number = 0;
        for (idx, slide) in self.slides.iter().enumerate() {
            let n = idx + 1;
            add(&format!("ppt/slides/slide{n}.xml"), &slide.xml);

            let mut slide_rels = format!(
                r#"<Relationship Id="rId1" Type="{REL_BASE}/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>"#
            );
            for (rel_id, chart_xml) in &slide.charts {
                chart_number += 1;
                add(&format!("ppt/charts/chart{chart_number}.xml"), chart_xml);
                slide_rels.push_str(&format!(
                    r#"<Relationship Id="{rel_id}" Type="{REL_BASE}/chart" Target="../charts/chart{chart_number}.xml"/>"#
                ));
            }
            add(
                &format!("ppt/slides/_rels/slide{n}.xml.rels"),
                &format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{REL_NS}">{slide_rels}</Relationships>"#
                ),
            );
        }

        drop(add);
        zip.finish().unwrap().into_inner()
    }
}
