//! The decoded-document data model.
//!
//! A [`DecodedDocument`] is the plain-data handoff from whatever opened
//! the PDF: per-page text spans with font and position metadata, per-page
//! plain text, and the document's native bookmark list if it has one.
//! Nothing in this crate performs PDF decoding itself; collaborators dump
//! this structure (typically as JSON) and the extractor consumes it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Italic bit in a span's font flags.
pub const FLAG_ITALIC: u32 = 1 << 1;

/// Bold bit in a span's font flags.
pub const FLAG_BOLD: u32 = 1 << 4;

/// Span rectangle in page coordinates, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

/// One run of text sharing a font, created once per parsed document and
/// never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
    #[serde(default)]
    pub font_flags: u32,
    pub bbox: BoundingBox,
    pub page_index: usize,
}

impl TextSpan {
    pub fn is_bold(&self) -> bool {
        self.font_flags & FLAG_BOLD != 0
    }

    pub fn is_italic(&self) -> bool {
        self.font_flags & FLAG_ITALIC != 0
    }
}

/// One page: its spans, its plain text, and its dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub spans: Vec<TextSpan>,
    #[serde(default)]
    pub text: String,
    pub width: f32,
    pub height: f32,
}

/// A native outline (bookmark) entry: nesting level, title, and the
/// 1-based page the viewer would jump to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub level: u32,
    pub title: String,
    pub page: i64,
}

/// A fully decoded document, ready for structure extraction and chunking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedDocument {
    /// Source file name, e.g. `"South of France - Hotels.pdf"`.
    pub name: String,
    pub pages: Vec<Page>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl DecodedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Walk every span of every page in reading order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages.iter().flat_map(|page| page.spans.iter())
    }

    /// Plain text of the whole document, pages joined by newlines.
    pub fn full_text(&self) -> String {
        let texts: Vec<&str> =
            self.pages.iter().map(|page| page.text.as_str()).collect();
        texts.join("\n")
    }

    /// Load a JSON dump produced by a collaborator's decoder.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
