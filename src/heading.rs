//! Heading classification over individual text spans.
//!
//! Each span gets an integer headingness score built from typographic
//! signals (font ratio against the document baseline, bold/italic flags),
//! textual patterns (numbered sections, keywords, all-caps, title case),
//! and layout hints (left alignment, word count, first page). Spans at or
//! above the threshold are headings; a second heuristic pass assigns
//! H1/H2/H3.

use std::sync::LazyLock;

use regex::Regex;

use crate::{config::StructureConfig, outline::HeadingLevel};

static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Numbered sections: "1. Chapter", "1.1 Section", "1.1.1 Subsection"
        r"^\d+\.?\s+[A-Z]",
        r"^\d+\.\d+\.?\s+[A-Z]",
        r"^\d+\.\d+\.\d+\.?\s+[A-Z]",
        // Roman numerals and letter sections
        r"^[IVX]+\.\s+[A-Z]",
        r"^[A-Z]\.\s+[A-Z]",
        // Chapter/Section keywords, mixed or upper case
        r"^(Chapter|Section|Part|Appendix)\s+\d+",
        r"^(CHAPTER|SECTION|PART|APPENDIX)\s+\d+",
        // All-caps lines
        r"^[A-Z][A-Z\s]{3,50}$",
        // Title-case multi-word lines
        r"^[A-Z][a-z]+(\s+[A-Z][a-z]+){1,8}$",
        // Interrogative headings
        r"^(What|How|Why|When|Where|Who)\s+[A-Z]",
        // Standard section names
        r"(?i)^(Conclusion|Summary|Abstract|Introduction|Background|Methodology|Results|Discussion)s?$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid heading pattern"))
    .collect()
});

static H1_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)^(CHAPTER|PART|SECTION)\s+\d+", r"^[A-Z][A-Z\s]{5,}$"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid H1 pattern"))
        .collect()
});

static H2_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^\d+\.?\s+[A-Z]", r"^[IVX]+\.\s"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid H2 pattern"))
        .collect()
});

/// Signals about one span, gathered by the caller during the page walk.
#[derive(Debug, Clone, Copy)]
pub struct SpanSignals {
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    /// x origin of the span as a fraction of the page width.
    pub x_ratio: f32,
    pub page_index: usize,
}

/// Classify a span into a heading level, or `None` when it does not
/// qualify. Used by the outline path; the italic flag contributes here.
pub fn classify_heading(
    text: &str,
    signals: SpanSignals,
    avg_font_size: f32,
    cfg: &StructureConfig,
) -> Option<HeadingLevel> {
    let clean = text.trim();
    let score = heading_score(clean, signals, avg_font_size, true, cfg)?;
    if score < cfg.heading_score_threshold {
        return None;
    }

    let font_ratio = font_ratio(signals.font_size, avg_font_size);
    let level = if font_ratio >= cfg.h1_font_ratio
        || H1_PATTERNS.iter().any(|p| p.is_match(clean))
    {
        HeadingLevel::H1
    } else if font_ratio >= cfg.h2_font_ratio
        || H2_PATTERNS.iter().any(|p| p.is_match(clean))
    {
        HeadingLevel::H2
    } else {
        HeadingLevel::H3
    };
    Some(level)
}

/// Plain yes/no heading check for the flat heading-list path that drives
/// chunking. Italic does not contribute in this variant.
pub fn is_heading(
    text: &str,
    signals: SpanSignals,
    avg_font_size: f32,
    cfg: &StructureConfig,
) -> bool {
    heading_score(text.trim(), signals, avg_font_size, false, cfg)
        .is_some_and(|score| score >= cfg.heading_score_threshold)
}

/// The 0-11 headingness score, or `None` when the text is out of bounds
/// for a heading altogether.
fn heading_score(
    clean: &str,
    signals: SpanSignals,
    avg_font_size: f32,
    count_italic: bool,
    cfg: &StructureConfig,
) -> Option<u32> {
    let chars = clean.chars().count();
    if chars < cfg.min_heading_chars || chars > cfg.max_heading_chars {
        return None;
    }

    let font_ratio = font_ratio(signals.font_size, avg_font_size);
    let mut score = 0;

    if font_ratio >= cfg.font_ratio_strong {
        score += 3;
    } else if font_ratio >= cfg.font_ratio_medium {
        score += 2;
    } else if font_ratio >= cfg.font_ratio_slight {
        score += 1;
    }

    if signals.bold {
        score += 2;
    }
    if count_italic && signals.italic {
        score += 1;
    }

    if HEADING_PATTERNS.iter().any(|p| p.is_match(clean)) {
        score += 3;
    }

    if signals.x_ratio < cfg.left_margin_ratio {
        score += 1;
    }

    let words = clean.split_whitespace().count();
    if (1..=cfg.max_heading_words).contains(&words) {
        score += 1;
    }

    if signals.page_index == 0 {
        score += 1;
    }

    Some(score)
}

fn font_ratio(font_size: f32, avg_font_size: f32) -> f32 {
    if avg_font_size > 0.0 {
        font_size / avg_font_size
    } else {
        1.0
    }
}
