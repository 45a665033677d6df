//! docsift - document outline extraction and persona-driven hybrid retrieval.
//!
//! docsift turns decoded PDF documents into a structural outline (title +
//! H1/H2/H3 headings, via font heuristics and table-of-contents
//! detection) and into heading-anchored content chunks ranked against a
//! persona-driven query by a domain-tuned BM25 index, optionally fused
//! with dense-embedding cosine similarity.
//!
//! # Quick start
//!
//! ```
//! use docsift::{
//!     BoundingBox, DecodedDocument, Domain, HybridIndex, Page,
//!     RetrievalConfig, SearchRequest, StructureConfig, TextSpan,
//! };
//! use docsift::{chunking::segment_chunks, outline};
//!
//! let doc = DecodedDocument {
//!     name: "notes.pdf".to_string(),
//!     pages: vec![Page {
//!         spans: vec![TextSpan {
//!             text: "1. Overview".to_string(),
//!             font_size: 18.0,
//!             font_flags: 0,
//!             bbox: BoundingBox { x0: 36.0, y0: 90.0, x1: 200.0, y1: 108.0 },
//!             page_index: 0,
//!         }],
//!         text: "1. Overview\ncoastal towns and harbor walks".to_string(),
//!         width: 612.0,
//!         height: 792.0,
//!     }],
//!     bookmarks: vec![],
//! };
//!
//! let config = StructureConfig::default();
//! let headings = outline::extract_headings(&doc, &config);
//! let chunks = segment_chunks(&doc, &headings);
//!
//! let index = HybridIndex::build(
//!     chunks,
//!     Domain::detect("Travel Planner", "find coastal walks"),
//!     None, // lexical-only without an embedding backend
//!     &RetrievalConfig::default(),
//! )
//! .unwrap();
//!
//! let results = index
//!     .search(
//!         &SearchRequest {
//!             persona: "Travel Planner".to_string(),
//!             task: "find coastal walks".to_string(),
//!             k: 3,
//!         },
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(results[0].section_title, "1. Overview");
//! ```

pub mod bm25;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod document;
pub mod domain;
pub mod embedder;
pub mod error;
pub mod heading;
pub mod outline;
pub mod retriever;
pub mod title;
pub mod toc;

pub use chunking::Chunk;
pub use config::{RetrievalConfig, StructureConfig};
pub use document::{BoundingBox, Bookmark, DecodedDocument, Page, TextSpan};
pub use domain::Domain;
pub use embedder::{Embedder, EmbeddingModel};
pub use error::{Error, Result};
pub use outline::{HeadingLevel, Outline, OutlineEntry};
pub use retriever::{HybridIndex, RetrievalResult, SearchRequest};
