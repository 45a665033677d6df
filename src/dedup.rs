//! Outline cleaning: normalization, fuzzy duplicate detection, and
//! date/time filtering.
//!
//! Extracted outlines routinely contain the same heading twice (once from
//! a running header, once from the body), variants that differ only in
//! numbering or punctuation, and artifacts like revision dates. The
//! cleaning pass drops all of these while keeping the first occurrence of
//! each genuine heading.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use strsim::normalized_levenshtein;

use crate::{config::StructureConfig, outline::OutlineEntry};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static LEADING_AFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\d\.\)\]\-\s]+").expect("valid leading affix regex")
});

static TRAILING_AFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\d\.\)\]\-\s]+$").expect("valid trailing affix regex")
});

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid non-word regex"));

static YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex")
});

static FOUR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\b").expect("valid digit regex"));

static MONTHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\b",
    )
    .expect("valid month regex")
});

static DATE_SLASHED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}[/-]\d{1,2}([/-]\d{2,4})?\b")
        .expect("valid date regex")
});

static ORDINAL_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}(st|nd|rd|th)\b").expect("valid ordinal regex")
});

static TIME_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(today|tomorrow|yesterday|week|month|year)\b")
        .expect("valid time word regex")
});

/// Canonical form of a heading for comparison: lowercase, collapsed
/// whitespace, numeric/punctuation affixes stripped, then every remaining
/// non-word character removed.
pub fn normalize_heading(text: &str) -> String {
    let lower = text.to_lowercase();
    let collapsed = WHITESPACE.replace_all(lower.trim(), " ");
    let stripped = LEADING_AFFIX.replace(&collapsed, "");
    let stripped = TRAILING_AFFIX.replace(&stripped, "");
    NON_WORD.replace_all(&stripped, "").trim().to_string()
}

/// Fuzzy equality on normalized headings: exact match, containment either
/// way, or edit similarity at or above `threshold`.
pub fn texts_similar(a: &str, b: &str, threshold: f64) -> bool {
    let norm_a = normalize_heading(a);
    let norm_b = normalize_heading(b);
    if norm_a.is_empty() || norm_b.is_empty() {
        return false;
    }
    if norm_a == norm_b || norm_a.contains(&norm_b) || norm_b.contains(&norm_a)
    {
        return true;
    }
    normalized_levenshtein(&norm_a, &norm_b) >= threshold
}

/// True when the text carries a year, a month name, a calendar date, an
/// ordinal day, or a relative-time word. Headings like these are almost
/// always footer artifacts rather than structure.
pub fn contains_date_or_time(text: &str) -> bool {
    if YEAR.is_match(text)
        || FOUR_DIGITS.is_match(text)
        || DATE_SLASHED.is_match(text)
        || ORDINAL_DAY.is_match(text)
    {
        return true;
    }
    let lower = text.to_lowercase();
    MONTHS.is_match(&lower) || TIME_WORDS.is_match(&lower)
}

/// The full cleaning pass over an extracted outline. Drops near-empty
/// entries, entries echoing the title, date/time artifacts, and
/// duplicates, in two sweeps: the first keyed on exact
/// `(level, normalized text, page)` plus fuzzy matching, the second a
/// fuzzy-only pass catching duplicates that slipped through with a
/// different level. Running the pass on its own output changes nothing.
pub fn clean_outline(
    title: &str,
    entries: Vec<OutlineEntry>,
    cfg: &StructureConfig,
) -> Vec<OutlineEntry> {
    let threshold = cfg.duplicate_similarity;
    let title_normalized = normalize_heading(title);

    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut seen_texts: Vec<String> = Vec::new();
    let mut cleaned: Vec<OutlineEntry> = Vec::new();

    for entry in entries {
        let text = entry.text.trim().to_string();
        let normalized = normalize_heading(&text);

        if text.is_empty() || normalized.chars().count() < 2 {
            continue;
        }
        if !title_normalized.is_empty()
            && texts_similar(&text, title, threshold)
        {
            continue;
        }
        if contains_date_or_time(&text) {
            continue;
        }
        if seen_texts
            .iter()
            .any(|existing| texts_similar(&text, existing, threshold))
        {
            continue;
        }

        let key = format!("{}:{}:{}", entry.level, normalized, entry.page);
        if !seen_keys.insert(key) {
            continue;
        }

        seen_texts.push(text.clone());
        cleaned.push(OutlineEntry { text, ..entry });
    }

    let mut final_texts: Vec<String> = Vec::new();
    let mut final_outline: Vec<OutlineEntry> = Vec::new();
    for entry in cleaned {
        if final_texts
            .iter()
            .any(|existing| texts_similar(&entry.text, existing, threshold))
        {
            continue;
        }
        final_texts.push(entry.text.clone());
        final_outline.push(entry);
    }

    final_outline
}
