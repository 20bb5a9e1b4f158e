//! PPTX package I/O.
//!
//! A .pptx file is a ZIP archive of XML parts tied together by relationship
//! files. The whole package is held in memory: every entry is kept as raw
//! bytes, slides and the charts they reference are parsed into trees, and on
//! save only the parts that were edited are serialized again.

use crate::dom::XmlDocument;
use crate::slide::{ChartPart, Slide};
use deck_core::{Error, PresentationFormat, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const SLIDE_REL_TYPE: &str = "/relationships/slide";
const CHART_REL_TYPE: &str = "/relationships/chart";

/// One raw ZIP entry.
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
}

/// An in-memory PPTX package.
#[derive(Debug)]
pub struct PptxPackage {
    entries: Vec<PackageEntry>,
    slides: Vec<Slide>,
}

impl PptxPackage {
    /// Load a presentation from disk.
    ///
    /// Any failure is reported as [`Error::DocumentLoad`].
    pub fn open(path: &Path) -> Result<Self> {
        let load = || -> Result<Self> {
            let mut file = File::open(path)?;
            let mut magic = [0u8; 8];
            let read = file.read(&mut magic)?;
            match PresentationFormat::from_magic(&magic[..read]) {
                Some(PresentationFormat::Pptx) => {}
                Some(PresentationFormat::Ppt) => {
                    return Err(Error::UnsupportedFormat(
                        "legacy .ppt files cannot be rewritten; save as .pptx first".to_string(),
                    ))
                }
                None => {
                    return Err(Error::UnsupportedFormat(
                        "not a ZIP-based Office document".to_string(),
                    ))
                }
            }
            file.rewind()?;
            Self::from_reader(BufReader::new(file))
        };

        load().map_err(|e| match e {
            Error::DocumentLoad(_) => e,
            other => Error::DocumentLoad(format!("{}: {}", path.display(), other)),
        })
    }

    /// Load a presentation from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for idx in 0..archive.len() {
            let mut file = archive
                .by_index(idx)
                .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", idx, e)))?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", file.name(), e)))?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
            });
        }

        let mut package = Self {
            entries,
            slides: Vec::new(),
        };
        package.slides = package.load_slides()?;
        log::debug!(
            "Loaded package with {} entries and {} slides",
            package.entries.len(),
            package.slides.len()
        );
        Ok(package)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    /// Write the package to `path` atomically.
    ///
    /// The archive is built in memory, written to a temporary file next to
    /// the destination and then moved into place. Any failure is reported as
    /// [`Error::DocumentSave`] and leaves no file at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let save = || -> Result<()> {
            let bytes = self.to_bytes()?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut builder = tempfile::Builder::new();
            // Same mode a plain `File::create` would give, subject to the umask.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                builder.permissions(std::fs::Permissions::from_mode(0o666));
            }
            let mut tmp = builder.tempfile_in(dir)?;
            tmp.write_all(&bytes)?;
            tmp.flush()?;
            tmp.persist(path).map_err(|e| Error::IoError(e.error))?;
            Ok(())
        };

        save().map_err(|e| match e {
            Error::DocumentSave(_) => e,
            other => Error::DocumentSave(format!("{}: {}", path.display(), other)),
        })
    }

    /// Serialize the package, re-encoding only modified parts.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut modified: HashMap<&str, Vec<u8>> = HashMap::new();
        for slide in &self.slides {
            if slide.is_dirty() {
                modified.insert(slide.path(), slide.document().to_xml()?);
            }
            for chart in slide.charts() {
                if chart.is_dirty() {
                    modified.insert(chart.path(), chart.document().to_xml()?);
                }
            }
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in &self.entries {
            let compression = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = FileOptions::default().compression_method(compression);
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", entry.name, e)))?;
            let data = modified
                .get(entry.name.as_str())
                .map_or(entry.data.as_slice(), Vec::as_slice);
            writer.write_all(data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }

    fn entry(&self, name: &str) -> Option<&PackageEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Read a part as UTF-8 text.
    fn read_part(&self, name: &str) -> Result<String> {
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::ZipError(format!("File not found in archive '{}'", name)))?;
        String::from_utf8(entry.data.clone())
            .map_err(|e| Error::XmlError(format!("'{}' is not UTF-8: {}", name, e)))
    }

    fn parse_part(&self, name: &str) -> Result<XmlDocument> {
        XmlDocument::parse(&self.read_part(name)?)
            .map_err(|e| Error::XmlError(format!("{}: {}", name, e)))
    }

    /// Relationships of a part; a part without a .rels file has none.
    fn relationships(&self, part: &str) -> Result<Vec<Relationship>> {
        let rels_path = rels_path_for(part);
        if self.entry(&rels_path).is_none() {
            return Ok(Vec::new());
        }
        let rels = self.parse_part(&rels_path)?;
        Ok(parse_relationships(&rels, part))
    }

    fn load_slides(&self) -> Result<Vec<Slide>> {
        let slide_paths = self.slide_order()?;
        let mut slides = Vec::with_capacity(slide_paths.len());

        for (idx, path) in slide_paths.into_iter().enumerate() {
            let document = self.parse_part(&path)?;
            let mut charts = HashMap::new();

            for rel in self.relationships(&path)? {
                if !rel.rel_type.ends_with(CHART_REL_TYPE) {
                    continue;
                }
                match self.parse_part(&rel.target) {
                    Ok(chart) => {
                        charts.insert(rel.id, ChartPart::new(rel.target, chart));
                    }
                    Err(e) => log::warn!("Slide {}: skipping chart {}: {}", idx + 1, rel.id, e),
                }
            }

            slides.push(Slide::new(idx + 1, path, document, charts));
        }

        Ok(slides)
    }

    /// Slide part paths in presentation order.
    ///
    /// `p:sldIdLst` in presentation.xml is authoritative; packages without it
    /// fall back to ordering slide relationships by number.
    fn slide_order(&self) -> Result<Vec<String>> {
        let rels = self.relationships(PRESENTATION_PART)?;
        let slide_rels: Vec<&Relationship> = rels
            .iter()
            .filter(|r| r.rel_type.ends_with(SLIDE_REL_TYPE))
            .collect();

        let presentation = self.parse_part(PRESENTATION_PART)?;
        if let Some(list) = presentation.root.child("sldIdLst") {
            let ordered: Vec<String> = list
                .children_named("sldId")
                .filter_map(|sld| sld.prefixed_attr("id"))
                .filter_map(|rid| {
                    let found = slide_rels.iter().find(|r| r.id == rid);
                    if found.is_none() {
                        log::warn!("Slide list references unknown relationship {}", rid);
                    }
                    found.map(|r| r.target.clone())
                })
                .collect();
            return Ok(ordered);
        }

        let mut slides: Vec<(String, Option<usize>)> = slide_rels
            .iter()
            .map(|r| {
                let order = extract_slide_number(&r.target).or_else(|| extract_slide_number(&r.id));
                (r.target.clone(), order)
            })
            .collect();
        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });
        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }
}

/// An internal relationship with its target resolved to a part name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    id: String,
    rel_type: String,
    target: String,
}

fn parse_relationships(rels: &XmlDocument, source_part: &str) -> Vec<Relationship> {
    rels.root
        .children_named("Relationship")
        .filter(|r| r.attr("TargetMode") != Some("External"))
        .filter_map(|r| {
            Some(Relationship {
                id: r.attr("Id")?.to_string(),
                rel_type: r.attr("Type")?.to_string(),
                target: resolve_target(source_part, r.attr("Target")?),
            })
        })
        .collect()
}

/// Path of the .rels file describing `part`.
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
