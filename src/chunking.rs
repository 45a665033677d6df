//! Splitting document text into heading-anchored chunks.
//!
//! Chunks are the unit of retrieval: the text between one detected
//! heading line and the next, tagged with the source file and a best-guess
//! page number. Documents without usable headings collapse to a single
//! whole-document chunk so they stay searchable.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::DecodedDocument;

/// Heading used for the whole-document fallback chunk.
const FALLBACK_HEADING: &str = "Document Content";

/// How many leading characters of a chunk are matched against page texts
/// when attributing a page number.
const PAGE_PROBE_CHARS: usize = 20;

/// A contiguous run of document text under one heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub heading: String,
    pub content: String,
    pub pdf_name: String,
    /// 1-based page the content starts on.
    pub page_number: usize,
}

/// Split a document's text at the given heading lines.
///
/// Headings must occupy a whole line to count as boundaries. Longer
/// headings are matched first so that a heading that prefixes another
/// cannot steal its line. Returns one chunk per heading that has content
/// after it; a document with text but no matching heading yields a single
/// fallback chunk, and a document with no text yields nothing.
pub fn segment_chunks(
    doc: &DecodedDocument,
    headings: &[String],
) -> Vec<Chunk> {
    let page_texts: Vec<&str> =
        doc.pages.iter().map(|page| page.text.as_str()).collect();
    let all_text = page_texts.join("\n");

    if headings.is_empty() {
        return fallback_chunk(doc, &all_text);
    }

    let mut sorted: Vec<&String> = headings.iter().collect();
    sorted.sort_by_key(|heading| std::cmp::Reverse(heading.len()));
    let alternation = sorted
        .iter()
        .map(|heading| regex::escape(heading))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(pattern) = Regex::new(&format!(r"(?m)^(?:{alternation})[ \t]*$"))
    else {
        debug!(doc = %doc.name, "heading pattern failed to compile");
        return fallback_chunk(doc, &all_text);
    };

    let matches: Vec<(usize, usize, &str)> = pattern
        .find_iter(&all_text)
        .map(|m| (m.start(), m.end(), m.as_str()))
        .collect();

    let mut chunks = Vec::new();
    for (i, &(_, end, matched)) in matches.iter().enumerate() {
        let content_end = matches
            .get(i + 1)
            .map_or(all_text.len(), |&(next_start, _, _)| next_start);
        let heading = matched.trim();
        let content = all_text[end..content_end].trim();
        if heading.is_empty() || content.is_empty() {
            continue;
        }
        chunks.push(Chunk {
            heading: heading.to_string(),
            content: content.to_string(),
            pdf_name: doc.name.clone(),
            page_number: find_page_number(content, &page_texts),
        });
    }

    if chunks.is_empty() {
        return fallback_chunk(doc, &all_text);
    }
    chunks
}

fn fallback_chunk(doc: &DecodedDocument, all_text: &str) -> Vec<Chunk> {
    let trimmed = all_text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    vec![Chunk {
        heading: FALLBACK_HEADING.to_string(),
        content: trimmed.to_string(),
        pdf_name: doc.name.clone(),
        page_number: 1,
    }]
}

/// Attribute content to the first page containing its opening characters.
fn find_page_number(content: &str, pages: &[&str]) -> usize {
    let probe: String = content.chars().take(PAGE_PROBE_CHARS).collect();
    for (i, page) in pages.iter().enumerate() {
        if page.contains(&probe) {
            return i + 1;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Page;

    fn doc(name: &str, page_texts: &[&str]) -> DecodedDocument {
        DecodedDocument {
            name: name.to_string(),
            pages: page_texts
                .iter()
                .map(|text| Page {
                    spans: vec![],
                    text: text.to_string(),
                    width: 612.0,
                    height: 792.0,
                })
                .collect(),
            bookmarks: vec![],
        }
    }

    fn headings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn two_headings_give_two_ordered_chunks() {
        let doc = doc(
            "guide.pdf",
            &["Intro\nwelcome text\nMethods\nprocedure text"],
        );
        let chunks =
            segment_chunks(&doc, &headings(&["Intro", "Methods"]));

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].heading, "Intro");
        assert_eq!(chunks[0].content, "welcome text");
        assert_eq!(chunks[1].heading, "Methods");
        assert_eq!(chunks[1].content, "procedure text");
        assert!(chunks.iter().all(|c| c.pdf_name == "guide.pdf"));
    }

    #[test]
    fn content_runs_to_end_of_document() {
        let doc = doc("d.pdf", &["Results\nfirst page tail", "second page"]);
        let chunks = segment_chunks(&doc, &headings(&["Results"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "first page tail\nsecond page");
    }

    #[test]
    fn heading_must_occupy_its_own_line() {
        let doc = doc(
            "d.pdf",
            &["the Intro was short\nIntro\nactual section body"],
        );
        let chunks = segment_chunks(&doc, &headings(&["Intro"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "actual section body");
    }

    #[test]
    fn longer_heading_wins_over_its_prefix() {
        let doc = doc(
            "d.pdf",
            &["Results\nbase text\nResults and Discussion\nextended text"],
        );
        let chunks = segment_chunks(
            &doc,
            &headings(&["Results", "Results and Discussion"]),
        );

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].heading, "Results");
        assert_eq!(chunks[1].heading, "Results and Discussion");
        assert_eq!(chunks[1].content, "extended text");
    }

    #[test]
    fn no_headings_yields_whole_document_chunk() {
        let doc = doc("d.pdf", &["just some text", "more text"]);
        let chunks = segment_chunks(&doc, &[]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading, "Document Content");
        assert_eq!(chunks[0].content, "just some text\nmore text");
        assert_eq!(chunks[0].page_number, 1);
    }

    #[test]
    fn unmatched_headings_fall_back_to_whole_document() {
        let doc = doc("d.pdf", &["plain text only"]);
        let chunks = segment_chunks(&doc, &headings(&["Nonexistent"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading, "Document Content");
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let doc = doc("d.pdf", &["", "   "]);
        assert!(segment_chunks(&doc, &[]).is_empty());
        assert!(segment_chunks(&doc, &headings(&["Intro"])).is_empty());
    }

    #[test]
    fn heading_with_regex_metacharacters_is_escaped() {
        let doc = doc("d.pdf", &["What? (A Study)\nbody text"]);
        let chunks =
            segment_chunks(&doc, &headings(&["What? (A Study)"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading, "What? (A Study)");
    }

    #[test]
    fn page_numbers_are_attributed_by_content_start() {
        let doc = doc(
            "d.pdf",
            &[
                "Intro\nalpha opening paragraph here",
                "Methods\nbravo second page paragraph",
            ],
        );
        let chunks =
            segment_chunks(&doc, &headings(&["Intro", "Methods"]));

        assert_eq!(chunks[0].page_number, 1);
        assert_eq!(chunks[1].page_number, 2);
    }

    #[test]
    fn heading_without_following_content_is_skipped() {
        let doc = doc("d.pdf", &["Intro\nbody\nTrailing Heading"]);
        let chunks = segment_chunks(
            &doc,
            &headings(&["Intro", "Trailing Heading"]),
        );

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].heading, "Intro");
    }
}
