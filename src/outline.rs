//! Outline extraction: title + hierarchical headings for one document.
//!
//! The table of contents wins when the document has one (native bookmarks
//! first, then a textual listing). Otherwise every span is scored by the
//! heading classifier and the result is forced into a consistent
//! H1/H2/H3 hierarchy. Both paths end in the same cleaning pass.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::StructureConfig,
    dedup,
    document::DecodedDocument,
    heading::{self, SpanSignals},
    title, toc,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingLevel::H1 => write!(f, "H1"),
            HeadingLevel::H2 => write!(f, "H2"),
            HeadingLevel::H3 => write!(f, "H3"),
        }
    }
}

/// One heading in the extracted outline. Pages are zero-indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: usize,
}

/// The structure extractor's final artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl Outline {
    /// The degraded-but-valid outline returned when a document cannot be
    /// decoded at all.
    pub fn degraded(name: &str) -> Self {
        Self {
            title: format!("Error processing {name}"),
            outline: Vec::new(),
        }
    }
}

/// Baseline font size: the mean span size over the first few pages, with
/// a constant fallback so later ratios never divide by zero.
pub fn average_font_size(
    doc: &DecodedDocument,
    cfg: &StructureConfig,
) -> f32 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for page in doc.pages.iter().take(cfg.sampled_pages) {
        for span in &page.spans {
            if span.font_size > 0.0 {
                sum += span.font_size;
                count += 1;
            }
        }
    }
    if count == 0 {
        cfg.fallback_font_size
    } else {
        sum / count as f32
    }
}

/// Extract the full outline for one document.
pub fn extract_outline(
    doc: &DecodedDocument,
    cfg: &StructureConfig,
) -> Outline {
    let raw_title = title::extract_title(doc, cfg);
    let title = collapse_whitespace(&raw_title);

    let entries = match toc::detect_toc(doc, cfg) {
        Some(toc_entries) => {
            info!(
                doc = %doc.name,
                entries = toc_entries.len(),
                "using table of contents for outline"
            );
            toc_entries
        }
        None => {
            info!(doc = %doc.name, "no table of contents, classifying spans");
            validate_hierarchy(classify_spans(doc, cfg))
        }
    };

    let outline = dedup::clean_outline(&title, entries, cfg);
    Outline { title, outline }
}

/// Flat heading texts only, used to drive chunking. No hierarchy pass and
/// no italic bonus; duplicates collapse on normalized text alone.
pub fn extract_headings(
    doc: &DecodedDocument,
    cfg: &StructureConfig,
) -> Vec<String> {
    let avg_font_size = average_font_size(doc, cfg);
    let mut seen: HashSet<String> = HashSet::new();
    let mut headings = Vec::new();

    for (page_index, page) in doc.pages.iter().enumerate() {
        for span in &page.spans {
            let text = span.text.trim();
            if text.is_empty() {
                continue;
            }
            let signals = span_signals(span, page, page_index);
            if !heading::is_heading(text, signals, avg_font_size, cfg) {
                continue;
            }
            if seen.insert(collapse_whitespace(&text.to_lowercase())) {
                headings.push(text.to_string());
            }
        }
    }

    headings
}

/// Walk every span and classify it, deduplicating on
/// `(level, normalized text, page)`.
fn classify_spans(
    doc: &DecodedDocument,
    cfg: &StructureConfig,
) -> Vec<OutlineEntry> {
    let avg_font_size = average_font_size(doc, cfg);
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();

    for (page_index, page) in doc.pages.iter().enumerate() {
        for span in &page.spans {
            let text = span.text.trim();
            if text.is_empty() {
                continue;
            }
            let signals = span_signals(span, page, page_index);
            let Some(level) =
                heading::classify_heading(text, signals, avg_font_size, cfg)
            else {
                continue;
            };

            let key = format!(
                "{level}:{}:{page_index}",
                collapse_whitespace(&text.to_lowercase())
            );
            if seen.insert(key) {
                entries.push(OutlineEntry {
                    level,
                    text: text.to_string(),
                    page: page_index,
                });
            }
        }
    }

    entries
}

fn span_signals(
    span: &crate::document::TextSpan,
    page: &crate::document::Page,
    page_index: usize,
) -> SpanSignals {
    let x_ratio = if page.width > 0.0 {
        span.bbox.x0 / page.width
    } else {
        0.0
    };
    SpanSignals {
        font_size: span.font_size,
        bold: span.is_bold(),
        italic: span.is_italic(),
        x_ratio,
        page_index,
    }
}

/// Force level consistency on a classified outline.
///
/// An H1 always starts a fresh section. An H2 needs a prior H1 unless the
/// outline is still empty (documents may open at H2). An H3 needs an H2
/// since the last H1. Rejected entries are dropped outright rather than
/// demoted, so a document opening at H3 loses those headings.
fn validate_hierarchy(entries: Vec<OutlineEntry>) -> Vec<OutlineEntry> {
    let mut validated: Vec<OutlineEntry> = Vec::new();
    let (mut h1_seen, mut h2_seen) = (0u32, 0u32);

    for entry in entries {
        match entry.level {
            HeadingLevel::H1 => {
                h1_seen = 1;
                h2_seen = 0;
                validated.push(entry);
            }
            HeadingLevel::H2 => {
                if h1_seen > 0 || validated.is_empty() {
                    h2_seen += 1;
                    validated.push(entry);
                }
            }
            HeadingLevel::H3 => {
                if h2_seen > 0 {
                    validated.push(entry);
                }
            }
        }
    }

    validated
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
