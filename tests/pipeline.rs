//! End-to-end pipeline tests: decoded documents in, outlines, chunks,
//! and ranked results out.

use std::hash::{DefaultHasher, Hash, Hasher};

use docsift::{
    BoundingBox, DecodedDocument, Domain, Embedder, HeadingLevel,
    HybridIndex, Outline, Page, RetrievalConfig, Result, SearchRequest,
    StructureConfig, TextSpan,
    chunking::segment_chunks,
    outline::{extract_headings, extract_outline},
};

fn span(
    text: &str,
    font_size: f32,
    y0: f32,
    page_index: usize,
) -> TextSpan {
    TextSpan {
        text: text.to_string(),
        font_size,
        font_flags: 0,
        bbox: BoundingBox {
            x0: 36.0,
            y0,
            x1: 500.0,
            y1: y0 + font_size,
        },
        page_index,
    }
}

fn page(spans: Vec<TextSpan>, text: &str) -> Page {
    Page {
        spans,
        text: text.to_string(),
        width: 612.0,
        height: 792.0,
    }
}

/// A one-page document with a title line, two section headings, body
/// prose under each, and enough body spans to anchor the font baseline.
fn sectioned_document(
    name: &str,
    title: &str,
    sections: &[(&str, &str)],
) -> DecodedDocument {
    let mut spans = vec![span(title, 30.0, 60.0, 0)];
    let mut text = String::new();

    let mut y = 420.0;
    for (heading, body) in sections {
        spans.push(span(heading, 21.0, y, 0));
        y += 30.0;
        for _ in 0..12 {
            spans.push(span(body, 12.0, y, 0));
            y += 14.0;
        }
        text.push_str(heading);
        text.push('\n');
        text.push_str(body);
        text.push('\n');
    }

    DecodedDocument {
        name: name.to_string(),
        pages: vec![page(spans, &text)],
        bookmarks: vec![],
    }
}

/// Deterministic bag-of-words embedder; no model download, no network.
struct HashEmbedder;

impl Embedder for HashEmbedder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; 64];
                for token in docsift::bm25::tokenize(text) {
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    vector[(hasher.finish() % 64) as usize] += 1.0;
                }
                vector
            })
            .collect())
    }
}

#[test]
fn outline_then_chunks_then_search() {
    let hotels = sectioned_document(
        "South of France - Hotels.pdf",
        "Hotel Guide",
        &[
            (
                "Budget Accommodation Options",
                "hostels and guesthouses with shared kitchens for groups",
            ),
            (
                "Luxury Seaside Resorts",
                "five star resorts overlooking private beaches",
            ),
        ],
    );
    let activities = sectioned_document(
        "South of France - Things to Do.pdf",
        "Activity Guide",
        &[
            (
                "Coastal Hikes Overview",
                "clifftop walking paths between fishing villages",
            ),
            (
                "Evening Entertainment Venues",
                "bars clubs and live music for groups of friends",
            ),
        ],
    );

    let config = StructureConfig::default();
    let mut chunks = Vec::new();
    for doc in [&hotels, &activities] {
        let outline = extract_outline(doc, &config);
        assert!(!outline.title.is_empty());
        assert!(!outline.outline.is_empty());

        let headings = extract_headings(doc, &config);
        assert!(!headings.is_empty());
        chunks.extend(segment_chunks(doc, &headings));
    }
    assert_eq!(chunks.len(), 4);
    assert!(chunks.iter().all(|c| !c.content.is_empty()));

    let persona = "Travel Planner";
    let task = "Plan a budget trip for a group of college friends";
    let domain = Domain::detect(persona, task);
    assert_eq!(domain, Domain::Travel);

    let index = HybridIndex::build(
        chunks,
        domain,
        None,
        &RetrievalConfig::default(),
    )
    .unwrap();

    let results = index
        .search(
            &SearchRequest {
                persona: persona.to_string(),
                task: task.to_string(),
                k: 5,
            },
            None,
        )
        .unwrap();

    assert!(!results.is_empty());
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.rank, i + 1);
        assert!(result.semantic_score.is_none());
        assert_eq!(
            result.query,
            "Travel Planner Plan a budget trip for a group of college friends"
        );
        // "trip" triggers the travel expansion vocabulary.
        assert!(result.enhanced_query.contains("vacation"));
    }

    // At most one result per source document.
    let mut documents: Vec<&str> =
        results.iter().map(|r| r.document.as_str()).collect();
    documents.sort();
    documents.dedup();
    assert_eq!(documents.len(), results.len());
}

#[test]
fn hybrid_search_with_backend_populates_semantic_scores() {
    let mains = sectioned_document(
        "Dinner Mains.pdf",
        "Main Course Collection",
        &[
            (
                "Vegetarian Main Courses",
                "vegetarian dinner recipes with ratatouille and risotto",
            ),
            (
                "Hearty Meat Classics",
                "braised beef and roasted lamb for cold months",
            ),
        ],
    );
    let desserts = sectioned_document(
        "Dinner Desserts.pdf",
        "Dessert Collection",
        &[
            (
                "Seasonal Dessert Choices",
                "fruit tarts and sorbets for warm evenings",
            ),
            (
                "Chilled Custard Ideas",
                "creme caramel and panna cotta variations",
            ),
        ],
    );

    let config = StructureConfig::default();
    let mut chunks = Vec::new();
    for doc in [&mains, &desserts] {
        let headings = extract_headings(doc, &config);
        chunks.extend(segment_chunks(doc, &headings));
    }
    assert_eq!(chunks.len(), 4);

    let mut backend = HashEmbedder;
    let index = HybridIndex::build(
        chunks,
        Domain::Culinary,
        Some(&mut backend),
        &RetrievalConfig::default(),
    )
    .unwrap();
    assert!(index.has_embeddings());

    let mut backend = HashEmbedder;
    let results = index
        .search(
            &SearchRequest {
                persona: "Food Contractor".to_string(),
                task: "prepare a vegetarian dinner recipe".to_string(),
                k: 2,
            },
            Some(&mut backend),
        )
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].section_title, "Vegetarian Main Courses");
    assert_eq!(results[0].document, "Dinner Mains.pdf");
    for result in &results {
        let semantic = result.semantic_score.expect("semantic score");
        assert!((0.0..=1.0).contains(&semantic));
        assert!((0.0..=1.0).contains(&result.hybrid_score));
    }
}

#[test]
fn bookmarked_document_outline_comes_from_its_toc() {
    let mut doc = sectioned_document(
        "datasheet.pdf",
        "Device Specification",
        &[("Electrical Characteristics", "voltage and current limits")],
    );
    doc.bookmarks = vec![
        docsift::Bookmark {
            level: 1,
            title: "Scope".to_string(),
            page: 1,
        },
        docsift::Bookmark {
            level: 2,
            title: "Normative References".to_string(),
            page: 2,
        },
        docsift::Bookmark {
            level: 5,
            title: "Pinout Detail".to_string(),
            page: 4,
        },
    ];

    let outline = extract_outline(&doc, &StructureConfig::default());
    let levels: Vec<HeadingLevel> =
        outline.outline.iter().map(|e| e.level).collect();
    assert_eq!(
        levels,
        [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3]
    );
    assert_eq!(outline.outline[0].page, 0);
    // Bookmark nesting deeper than three levels flattens to H3.
    assert_eq!(outline.outline[2].text, "Pinout Detail");
}

#[test]
fn degraded_outline_keeps_the_output_schema() {
    let outline = Outline::degraded("unreadable.pdf");
    let value = serde_json::to_value(&outline).unwrap();

    assert_eq!(
        value.get("title").unwrap().as_str().unwrap(),
        "Error processing unreadable.pdf"
    );
    assert_eq!(value.get("outline").unwrap().as_array().unwrap().len(), 0);
}

#[test]
fn documents_without_headings_still_become_one_chunk() {
    let doc = DecodedDocument {
        name: "flyer.pdf".to_string(),
        pages: vec![page(
            vec![span("plain prose only, nothing heading shaped", 12.0, 400.0, 0)],
            "plain prose only, nothing heading shaped",
        )],
        bookmarks: vec![],
    };

    let config = StructureConfig::default();
    let headings = extract_headings(&doc, &config);
    let chunks = segment_chunks(&doc, &headings);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].heading, "Document Content");

    let index = HybridIndex::build(
        chunks,
        Domain::General,
        None,
        &RetrievalConfig::default(),
    )
    .unwrap();
    let results = index
        .search(
            &SearchRequest {
                persona: "Archivist".to_string(),
                task: "catalogue prose".to_string(),
                k: 3,
            },
            None,
        )
        .unwrap();
    assert_eq!(results.len(), 1);
}
