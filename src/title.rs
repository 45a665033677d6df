//! Title extraction from the first page.
//!
//! The title is assumed to be the largest-font text in the top half of
//! page 1. Decoders often emit a visually single line as several
//! overlapping runs, so consecutive title lines are merged on their
//! longest suffix/prefix overlap instead of plain concatenation.

use crate::{config::StructureConfig, document::DecodedDocument};

/// Extract the document title, or an empty string when nothing in the
/// title region qualifies.
pub fn extract_title(doc: &DecodedDocument, cfg: &StructureConfig) -> String {
    let Some(page) = doc.pages.first() else {
        return String::new();
    };
    let cutoff = page.height * cfg.title_region;

    let max_font = page
        .spans
        .iter()
        .filter(|span| span.bbox.y0 < cutoff)
        .map(|span| span.font_size)
        .fold(f32::NEG_INFINITY, f32::max);
    if !max_font.is_finite() {
        return String::new();
    }

    let mut title = String::new();
    for line in group_lines(page) {
        if line.y0 >= cutoff || line.text.is_empty() {
            continue;
        }

        let all_max = line
            .font_sizes
            .iter()
            .all(|&size| (size - max_font).abs() < cfg.title_font_epsilon);
        let all_continuation = line.font_sizes.iter().all(|&size| {
            size >= cfg.title_continuation_floor && size < max_font
        });

        if all_max {
            title = merge_overlapping(&title, &line.text);
        } else if all_continuation {
            if title.is_empty() {
                title = line.text;
            } else {
                title.push(' ');
                title.push_str(&line.text);
            }
        }
    }

    title
}

struct Line {
    text: String,
    font_sizes: Vec<f32>,
    y0: f32,
}

/// Group a page's spans into visual lines by their top coordinate. Spans
/// arrive in reading order, so a new line starts whenever the vertical
/// position moves.
fn group_lines(page: &crate::document::Page) -> Vec<Line> {
    const LINE_EPSILON: f32 = 0.5;

    let mut lines: Vec<Line> = Vec::new();
    for span in &page.spans {
        let text = span.text.trim();

        let same_line = lines
            .last()
            .is_some_and(|line| (line.y0 - span.bbox.y0).abs() < LINE_EPSILON);
        if same_line {
            let line = lines.last_mut().unwrap();
            if !text.is_empty() {
                if !line.text.is_empty() {
                    line.text.push(' ');
                }
                line.text.push_str(text);
            }
            line.font_sizes.push(span.font_size);
        } else {
            lines.push(Line {
                text: text.to_string(),
                font_sizes: vec![span.font_size],
                y0: span.bbox.y0,
            });
        }
    }
    lines
}

/// Append `addition` to `base`, dropping the longest prefix of `addition`
/// that `base` already ends with.
fn merge_overlapping(base: &str, addition: &str) -> String {
    let mut overlap = 0;
    for (idx, _) in addition
        .char_indices()
        .skip(1)
        .chain(std::iter::once((addition.len(), '\0')))
    {
        if base.ends_with(&addition[..idx]) {
            overlap = idx;
        }
    }

    let mut merged = base.to_string();
    merged.push_str(&addition[overlap..]);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BoundingBox, Page, TextSpan};

    fn span(text: &str, font_size: f32, y0: f32) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            font_size,
            font_flags: 0,
            bbox: BoundingBox {
                x0: 72.0,
                y0,
                x1: 400.0,
                y1: y0 + font_size,
            },
            page_index: 0,
        }
    }

    fn doc_with_spans(spans: Vec<TextSpan>) -> DecodedDocument {
        DecodedDocument {
            name: "doc.pdf".to_string(),
            pages: vec![Page {
                spans,
                text: String::new(),
                width: 612.0,
                height: 792.0,
            }],
            bookmarks: vec![],
        }
    }

    #[test]
    fn merge_overlapping_drops_shared_run() {
        assert_eq!(merge_overlapping("RFP: Req", "Request for Proposal"), "RFP: Request for Proposal");
        assert_eq!(merge_overlapping("", "Title"), "Title");
        assert_eq!(merge_overlapping("Title", "Title"), "Title");
    }

    #[test]
    fn merge_overlapping_without_overlap_concatenates() {
        assert_eq!(merge_overlapping("Alpha", "Beta"), "AlphaBeta");
    }

    #[test]
    fn largest_font_line_becomes_title() {
        let doc = doc_with_spans(vec![
            span("Annual Report 2024", 28.0, 100.0),
            span("Prepared by the finance team", 11.0, 140.0),
        ]);
        assert_eq!(
            extract_title(&doc, &StructureConfig::default()),
            "Annual Report 2024"
        );
    }

    #[test]
    fn overlapping_runs_merge_once() {
        // Decoders sometimes re-emit the tail of a line as a second run.
        let doc = doc_with_spans(vec![
            span("Annual Report", 28.0, 100.0),
            span("Report 2024", 28.0, 130.0),
        ]);
        assert_eq!(
            extract_title(&doc, &StructureConfig::default()),
            "Annual Report 2024"
        );
    }

    #[test]
    fn continuation_line_joins_with_space() {
        let doc = doc_with_spans(vec![
            span("Comprehensive Guide", 28.0, 100.0),
            span("to the South of France", 24.0, 140.0),
        ]);
        assert_eq!(
            extract_title(&doc, &StructureConfig::default()),
            "Comprehensive Guide to the South of France"
        );
    }

    #[test]
    fn body_sized_lines_are_ignored() {
        let doc = doc_with_spans(vec![
            span("Some Title", 28.0, 100.0),
            span("ordinary paragraph text", 12.0, 200.0),
        ]);
        assert_eq!(
            extract_title(&doc, &StructureConfig::default()),
            "Some Title"
        );
    }

    #[test]
    fn lines_below_title_region_are_ignored() {
        let doc = doc_with_spans(vec![span("Footer Banner", 30.0, 700.0)]);
        assert_eq!(extract_title(&doc, &StructureConfig::default()), "");
    }

    #[test]
    fn empty_document_yields_empty_title() {
        let doc = DecodedDocument {
            name: "doc.pdf".to_string(),
            pages: vec![],
            bookmarks: vec![],
        };
        assert_eq!(extract_title(&doc, &StructureConfig::default()), "");
    }

    #[test]
    fn mixed_font_line_is_not_a_title_line() {
        // A line mixing title-sized and body-sized runs fails both the
        // exact-max and the continuation checks.
        let doc = doc_with_spans(vec![
            span("Actual Title", 28.0, 100.0),
            span("mixed", 28.0, 140.0),
            span("sizes", 12.0, 140.0),
        ]);
        assert_eq!(
            extract_title(&doc, &StructureConfig::default()),
            "Actual Title"
        );
    }
}
