//! The translation pipeline: load, locate, translate, reconstruct, save.

use crate::locate::{locate_units, preview};
use crate::package::PptxPackage;
use crate::reconstruct::reconstruct;
use crate::slide::Slide;
use deck_core::{
    Error, Language, Reconstruction, Result, RunSummary, SlideOutcome, TranslationUnit, Translator,
};
use serde::Serialize;
use std::path::Path;

/// Units of one slide after the translation phase.
#[derive(Debug, Default)]
pub struct TranslateOutcome {
    pub units: Vec<TranslationUnit>,
    /// Units whose text came back untranslated.
    pub passed_through: usize,
}

/// Templates found on one slide, for inspection.
#[derive(Debug, Serialize)]
pub struct SlideUnits {
    pub slide: usize,
    pub units: Vec<TranslationUnit>,
}

/// Translate the presentation at `input` into `target` and write it to
/// `output`.
///
/// The language code is checked before the input is opened, and `output`
/// must not be the input file. Nothing is written unless the whole
/// presentation was processed.
pub fn translate_presentation<T: Translator>(
    input: &Path,
    output: &Path,
    target: &str,
    translator: &T,
) -> Result<RunSummary> {
    let language = Language::parse(target)?;
    if same_file(input, output) {
        return Err(Error::DocumentSave(format!(
            "output {} would overwrite the input",
            output.display()
        )));
    }

    log::info!(
        "Translating {} into {}",
        input.display(),
        language.display_name()
    );
    let mut package = PptxPackage::open(input)?;
    let summary = translate_package(&mut package, language, translator);
    package.save(output)?;
    log::info!("Saved {}", output.display());

    Ok(summary)
}

/// Translate every slide of an already loaded package in place.
pub fn translate_package<T: Translator>(
    package: &mut PptxPackage,
    language: Language,
    translator: &T,
) -> RunSummary {
    let total = package.slides().len();
    let slides = package
        .slides_mut()
        .iter_mut()
        .map(|slide| {
            log::info!("Processing slide {}/{}", slide.number(), total);
            translate_slide(slide, language, translator)
        })
        .collect();

    RunSummary { slides }
}

/// Locate, translate and rewrite the text units of one slide.
pub fn translate_slide<T: Translator>(
    slide: &mut Slide,
    language: Language,
    translator: &T,
) -> SlideOutcome {
    let mut outcome = SlideOutcome::new(slide.number());

    let located = locate_units(slide);
    outcome.units = located.units.len();
    outcome.locate_failures = located.failures;
    if located.units.is_empty() {
        log::debug!("Slide {}: no text to translate", slide.number());
        return outcome;
    }

    let translated = translate_units(located.units, language, translator);
    outcome.passed_through = translated.passed_through;

    for unit in &translated.units {
        let result = slide
            .container_mut(&unit.location)
            .map(|mut container| reconstruct(&mut container, &unit.template, &unit.translated_text));
        match result {
            Ok(Reconstruction::Templated) => outcome.templated += 1,
            Ok(Reconstruction::PlainText) => outcome.plain_text += 1,
            Ok(Reconstruction::Failed) => outcome.failed += 1,
            Err(e) => {
                log::warn!("Slide {}: {} not written: {}", slide.number(), unit.location, e);
                outcome.failed += 1;
            }
        }
    }

    log::info!(
        "Slide {}: {} of {} text units written",
        slide.number(),
        outcome.applied(),
        outcome.units
    );
    outcome
}

/// Fill in `translated_text` for each unit, one request at a time.
pub fn translate_units<T: Translator>(
    units: Vec<TranslationUnit>,
    language: Language,
    translator: &T,
) -> TranslateOutcome {
    let mut outcome = TranslateOutcome::default();

    for mut unit in units {
        log::debug!(
            "Translating {} '{}'",
            unit.kind().as_str(),
            preview(&unit.original_text)
        );
        let translation = translator.translate(&unit.original_text, language);
        if translation.is_passed_through() {
            outcome.passed_through += 1;
        }
        unit.translated_text = translation.into_text();
        outcome.units.push(unit);
    }

    outcome
}

/// List the units and templates of every slide without translating.
pub fn inspect_presentation(input: &Path) -> Result<Vec<SlideUnits>> {
    let package = PptxPackage::open(input)?;
    Ok(package
        .slides()
        .iter()
        .map(|slide| SlideUnits {
            slide: slide.number(),
            units: locate_units(slide).units,
        })
        .collect())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, PackageBuilder};
    use deck_core::{ContentBlockRef, Translation};
    use deck_client::{ClientConfig, MessageRequest, ServiceError, TranslationClient, Transport};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Translates from a fixed table; anything else passes through.
    struct Dictionary {
        entries: HashMap<&'static str, &'static str>,
        requests: RefCell<Vec<String>>,
    }

    impl Dictionary {
        fn new(entries: &[(&'static str, &'static str)]) -> Self {
            Self {
                entries: entries.iter().copied().collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Translator for Dictionary {
        fn translate(&self, text: &str, _target: Language) -> Translation {
            self.requests.borrow_mut().push(text.to_string());
            match self.entries.get(text) {
                Some(out) => Translation::Translated(out.to_string()),
                None => Translation::PassedThrough {
                    text: text.to_string(),
                    reason: "throttled".to_string(),
                },
            }
        }
    }

    fn write_input(dir: &Path, bytes: Vec<u8>) -> PathBuf {
        let path = dir.join("deck.pptx");
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn sample_deck() -> Vec<u8> {
        PackageBuilder::new()
            .slide(&fixtures::slide(&[
                fixtures::text_shape("Hello"),
                fixtures::table(&[&["Name", "Score"]]),
            ]))
            .slide_with_chart(
                &fixtures::slide(&[fixtures::chart_frame("rId2")]),
                "rId2",
                &fixtures::chart_part(Some("Sales")),
            )
            .build()
    }

    fn text_at(package: &PptxPackage, slide: usize, location: ContentBlockRef) -> String {
        package.slides()[slide].container(&location).unwrap().text()
    }

    #[test]
    fn test_translates_every_container_kind() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), sample_deck());
        let output = dir.path().join("deck_translated_ko.pptx");
        let translator = Dictionary::new(&[
            ("Hello", "안녕하세요"),
            ("Name", "이름"),
            ("Score", "점수"),
            ("Sales", "매출"),
        ]);

        let summary = translate_presentation(&input, &output, "ko", &translator).unwrap();

        assert!(summary.succeeded());
        assert_eq!(summary.units_succeeded(), 4);
        assert_eq!(summary.units_passed_through(), 0);

        let translated = PptxPackage::open(&output).unwrap();
        assert_eq!(text_at(&translated, 0, ContentBlockRef::Plain { block: 0 }), "안녕하세요");
        assert_eq!(
            text_at(&translated, 0, ContentBlockRef::TableCell { block: 1, row: 0, col: 1 }),
            "점수"
        );
        assert_eq!(text_at(&translated, 1, ContentBlockRef::ChartTitle { block: 0 }), "매출");

        // The input is left as it was.
        let original = PptxPackage::open(&input).unwrap();
        assert_eq!(text_at(&original, 0, ContentBlockRef::Plain { block: 0 }), "Hello");
    }

    #[test]
    fn test_unsupported_language_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), sample_deck());
        let output = dir.path().join("out.pptx");
        let translator = Dictionary::new(&[]);

        let err = translate_presentation(&input, &output, "xx", &translator).unwrap_err();

        assert!(matches!(err, Error::UnsupportedLanguage { .. }));
        assert!(!output.exists());
        assert!(translator.requests.borrow().is_empty());
    }

    #[test]
    fn test_pass_through_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            PackageBuilder::new()
                .slide(&fixtures::slide(&[
                    fixtures::text_shape("Unlucky"),
                    fixtures::text_shape("Lucky"),
                ]))
                .build(),
        );
        let output = dir.path().join("out.pptx");
        let translator = Dictionary::new(&[("Lucky", "Chanceux")]);

        let summary = translate_presentation(&input, &output, "fr", &translator).unwrap();

        assert_eq!(*translator.requests.borrow(), vec!["Unlucky", "Lucky"]);
        assert_eq!(summary.units_passed_through(), 1);
        assert_eq!(summary.units_succeeded(), 2);

        let translated = PptxPackage::open(&output).unwrap();
        assert_eq!(text_at(&translated, 0, ContentBlockRef::Plain { block: 0 }), "Unlucky");
        assert_eq!(text_at(&translated, 0, ContentBlockRef::Plain { block: 1 }), "Chanceux");
    }

    /// Answers every request with a rate-limit error.
    struct AlwaysThrottled {
        requests: Rc<Cell<usize>>,
    }

    impl Transport for AlwaysThrottled {
        fn send(&self, _request: &MessageRequest) -> std::result::Result<String, ServiceError> {
            self.requests.set(self.requests.get() + 1);
            Err(ServiceError::Throttled("rate_limit_error".to_string()))
        }
    }

    #[test]
    fn test_throttled_service_leaves_text_and_visits_every_unit() {
        let requests = Rc::new(Cell::new(0));
        let client = TranslationClient::new(
            ClientConfig::default(),
            AlwaysThrottled {
                requests: Rc::clone(&requests),
            },
        )
        .with_sleep(|_| {});
        let mut slide = Slide::new(
            1,
            "ppt/slides/slide1.xml".to_string(),
            crate::dom::XmlDocument::parse(&fixtures::slide(&[
                fixtures::text_shape("First point"),
                fixtures::text_shape("Second point"),
            ]))
            .unwrap(),
            HashMap::new(),
        );

        let outcome = translate_slide(&mut slide, Language::Ko, &client);

        assert_eq!(requests.get(), 10);
        assert_eq!(outcome.units, 2);
        assert_eq!(outcome.passed_through, 2);
        assert_eq!(outcome.applied(), 2);
        let text = |block| slide.container(&ContentBlockRef::Plain { block }).unwrap().text();
        assert_eq!(text(0), "First point");
        assert_eq!(text(1), "Second point");
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_deck();
        let input = write_input(dir.path(), bytes.clone());

        let err = translate_presentation(&input, &input, "ko", &Dictionary::new(&[])).unwrap_err();

        assert!(matches!(err, Error::DocumentSave(_)));
        assert_eq!(std::fs::read(&input).unwrap(), bytes);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_mode_matches_plainly_written_input() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), sample_deck());
        let output = dir.path().join("deck_translated_ko.pptx");

        translate_presentation(&input, &output, "ko", &Dictionary::new(&[])).unwrap();

        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&output), mode(&input));
    }

    #[test]
    fn test_missing_input_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pptx");

        let err = translate_presentation(
            &dir.path().join("missing.pptx"),
            &output,
            "ja",
            &Dictionary::new(&[]),
        )
        .unwrap_err();

        assert!(matches!(err, Error::DocumentLoad(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_slide_without_text_counts_as_success() {
        let mut slide = Slide::new(
            1,
            "ppt/slides/slide1.xml".to_string(),
            crate::dom::XmlDocument::parse(&fixtures::slide(&[fixtures::picture()])).unwrap(),
            HashMap::new(),
        );

        let outcome = translate_slide(&mut slide, Language::De, &Dictionary::new(&[]));

        assert_eq!(outcome.units, 0);
        assert!(outcome.is_success());
        assert!(!slide.is_dirty());
    }

    #[test]
    fn test_inspect_lists_templates() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), sample_deck());

        let slides = inspect_presentation(&input).unwrap();

        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].units.len(), 3);
        assert_eq!(slides[1].units[0].original_text, "Sales");
        let json = serde_json::to_string(&slides).unwrap();
        assert!(json.contains("\"original_text\":\"Hello\""));
    }
}
