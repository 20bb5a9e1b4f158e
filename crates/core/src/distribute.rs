//! Distribution of translated text over a paragraph's run templates.
//!
//! Translation destroys the correspondence between text spans and runs, so the
//! mapping back is heuristic: short text, or text that does not split into at
//! most one sentence per original run, is given the first run's formatting.

use crate::template::RunTemplate;
use std::ops::Range;

/// Trimmed text shorter than this (in characters) is never split.
pub const SHORT_TEXT_THRESHOLD: usize = 50;

/// Characters that close a sentence, including full-width forms.
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', '。', '．', '！', '？'];

/// A span of translated text and the run formatting it will be written with.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub template: RunTemplate,
}

impl Segment {
    fn new(text: impl Into<String>, template: RunTemplate) -> Self {
        Self {
            text: text.into(),
            template,
        }
    }
}

/// Map `text` onto `templates`, returning one segment per run to emit.
///
/// Concatenating the returned segments always reproduces `text` exactly.
pub fn distribute(text: &str, templates: &[RunTemplate]) -> Vec<Segment> {
    let first = templates.first().cloned().unwrap_or_default();

    if templates.len() <= 1 || text.trim().chars().count() < SHORT_TEXT_THRESHOLD {
        return vec![Segment::new(text, first)];
    }

    let spans = sentence_spans(text);
    if spans.is_empty() {
        log::debug!("No sentences found in {} chars, using first run format", text.len());
        return vec![Segment::new(text, first)];
    }
    if spans.len() > templates.len() {
        log::debug!(
            "{} sentences for {} runs, collapsing to first run format",
            spans.len(),
            templates.len()
        );
        return vec![Segment::new(text, first)];
    }

    let last = templates.len() - 1;
    (0..spans.len())
        .map(|i| {
            // Leading whitespace belongs to the first segment, whitespace
            // between sentences to the segment before it.
            let start = if i == 0 { 0 } else { spans[i].start };
            let end = spans.get(i + 1).map_or(text.len(), |next| next.start);
            Segment::new(&text[start..end], templates[i.min(last)].clone())
        })
        .collect()
}

/// Split text into trimmed sentences.
///
/// A sentence closes at each terminal punctuation mark; trailing text without
/// a terminator forms the final sentence.
pub fn segment_sentences(text: &str) -> Vec<&str> {
    sentence_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Byte ranges of the trimmed sentences in `text`.
fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        if SENTENCE_TERMINATORS.contains(&ch) {
            let end = idx + ch.len_utf8();
            push_trimmed(&mut spans, text, start..end);
            start = end;
        }
    }
    push_trimmed(&mut spans, text, start..text.len());

    spans
}

fn push_trimmed(spans: &mut Vec<Range<usize>>, text: &str, range: Range<usize>) {
    let slice = &text[range.clone()];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let start = range.start + (slice.len() - slice.trim_start().len());
    spans.push(start..start + trimmed.len());
}
