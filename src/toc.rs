//! Table-of-contents detection.
//!
//! Two strategies, tried in order: the document's native bookmark list,
//! then a textual scan of the early pages for a "Table of Contents"
//! listing. The first strategy to produce entries wins; when both come up
//! empty the caller falls back to span-by-span heading classification.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    config::StructureConfig,
    document::DecodedDocument,
    outline::{HeadingLevel, OutlineEntry},
};

static TOC_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)table\s+of\s+contents").expect("valid TOC marker regex")
});

static SECTION_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)*\.?$").expect("valid section number regex")
});

/// Page numbers in a TOC listing are small; anything this large is a
/// section number or stray text.
const MAX_TOC_PAGE: u64 = 1000;

/// Detect a table of contents, native bookmarks first.
pub fn detect_toc(
    doc: &DecodedDocument,
    cfg: &StructureConfig,
) -> Option<Vec<OutlineEntry>> {
    if let Some(entries) = from_bookmarks(doc) {
        return Some(entries);
    }
    scan_text_toc(doc, cfg)
}

/// Map the native bookmark list onto outline entries. Nesting level 1 is
/// H1, level 2 is H2, and anything deeper collapses to H3. Bookmark pages
/// are 1-based and become zero-indexed here.
fn from_bookmarks(doc: &DecodedDocument) -> Option<Vec<OutlineEntry>> {
    let entries: Vec<OutlineEntry> = doc
        .bookmarks
        .iter()
        .filter(|bookmark| !bookmark.title.trim().is_empty() && bookmark.page > 0)
        .map(|bookmark| OutlineEntry {
            level: match bookmark.level {
                1 => HeadingLevel::H1,
                2 => HeadingLevel::H2,
                _ => HeadingLevel::H3,
            },
            text: bookmark.title.trim().to_string(),
            page: (bookmark.page - 1) as usize,
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        debug!(count = entries.len(), "using native bookmark outline");
        Some(entries)
    }
}

/// Scan the first few pages for a textual TOC listing and parse it.
fn scan_text_toc(
    doc: &DecodedDocument,
    cfg: &StructureConfig,
) -> Option<Vec<OutlineEntry>> {
    let search_pages = doc.pages.len().min(cfg.sampled_pages);

    for (page_index, page) in doc.pages.iter().take(search_pages).enumerate() {
        if !TOC_MARKER.is_match(&page.text) {
            continue;
        }
        debug!(page = page_index, "textual table of contents marker found");

        // Everything after the marker line is the listing.
        let lines: Vec<&str> = page
            .text
            .lines()
            .skip_while(|line| !TOC_MARKER.is_match(line))
            .skip(1)
            .collect();

        let entries = parse_toc_lines(&lines);
        if !entries.is_empty() {
            return Some(entries);
        }
    }

    None
}

/// Parse the token stream of a textual TOC listing.
///
/// A section-number token opens a numbered entry whose level follows from
/// its dotted depth; subsequent tokens accumulate as the title until a
/// standalone page number terminates the entry. A token starting with an
/// uppercase letter opens an unnumbered H1 entry terminated the same way.
/// Entries that never reach a page number are discarded.
fn parse_toc_lines(lines: &[&str]) -> Vec<OutlineEntry> {
    let entries: Vec<&str> = lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    let mut outline = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let current = entries[i];

        if SECTION_NUMBER.is_match(current) {
            let level = level_for_section(current);
            let mut title_parts: Vec<&str> = Vec::new();
            i += 1;

            while i < entries.len() {
                if let Some(page) = page_number(entries[i]) {
                    let title = title_parts.join(" ");
                    let title = title.trim();
                    if !title.is_empty() {
                        outline.push(OutlineEntry {
                            level,
                            text: format!("{current} {title}"),
                            page,
                        });
                    }
                    break;
                }
                title_parts.push(entries[i]);
                i += 1;
            }
        } else if starts_uppercase(current) {
            let mut title_parts = vec![current];
            i += 1;

            while i < entries.len() {
                let next = entries[i];
                if let Some(page) = page_number(next) {
                    outline.push(OutlineEntry {
                        level: HeadingLevel::H1,
                        text: title_parts.join(" ").trim().to_string(),
                        page,
                    });
                    break;
                } else if SECTION_NUMBER.is_match(next) {
                    // Give the section number back to the outer loop.
                    i -= 1;
                    break;
                }
                title_parts.push(next);
                i += 1;
            }
        }

        i += 1;
    }

    outline
}

/// Heading level from the dotted depth of a section number: "3" is H1,
/// "3.1" is H2, "3.1.1" and deeper are H3.
fn level_for_section(section: &str) -> HeadingLevel {
    let parts = section.trim_end_matches('.').split('.').count();
    match parts {
        1 => HeadingLevel::H1,
        2 => HeadingLevel::H2,
        _ => HeadingLevel::H3,
    }
}

fn page_number(token: &str) -> Option<usize> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u64 = token.parse().ok()?;
    (value < MAX_TOC_PAGE).then_some(value as usize)
}

fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
        && !token.chars().all(|c| c.is_ascii_digit())
}
