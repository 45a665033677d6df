//! Hybrid retrieval: domain-tuned BM25 fused with optional dense
//! embeddings, finished by diversity-aware top-k selection.
//!
//! The index is built once over a pooled chunk set and is immutable
//! afterwards; searching is a pure read. Chunks are never mutated: each
//! result is a copy of the chunk's fields annotated with scores and the
//! query that produced it.

use serde::Serialize;
use strsim::normalized_levenshtein;
use tracing::{debug, info, warn};

use crate::{
    bm25::{self, Bm25Index},
    chunking::Chunk,
    config::RetrievalConfig,
    domain::Domain,
    embedder::{Embedder, cosine_similarity},
    error::{Error, Result},
};

/// Keywords appended to a chunk's text representation when its source
/// file name carries a recognizable topic. First matching row wins.
const FILENAME_ENRICHMENT: &[(&[&str], &str)] = &[
    (&["main"], "main dish recipe"),
    (&["side"], "side dish accompaniment"),
    (&["breakfast"], "breakfast meal morning"),
    (&["lunch"], "lunch meal midday"),
    (&["dinner"], "dinner meal evening"),
    (&["cities"], "city urban destination"),
    (&["hotels"], "accommodation lodging stay"),
    (&["restaurants"], "dining food cuisine"),
    (&["things to do"], "activities attractions sights"),
    (&["create", "convert"], "creation conversion setup"),
    (&["edit"], "editing modification change"),
    (&["export"], "exportation output"),
    (&["fill", "sign"], "form filling signature"),
];

/// A persona-driven query: who is asking, what they need, how many
/// results they want.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub persona: String,
    pub task: String,
    pub k: usize,
}

/// One ranked chunk copy, annotated for auditability.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub document: String,
    pub section_title: String,
    pub refined_text: String,
    pub page_number: usize,
    pub rank: usize,
    pub hybrid_score: f32,
    pub lexical_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,
    pub query: String,
    pub enhanced_query: String,
}

/// Immutable hybrid index over one chunk set.
pub struct HybridIndex {
    chunks: Vec<Chunk>,
    domain: Domain,
    bm25: Bm25Index,
    embeddings: Option<Vec<Vec<f32>>>,
    config: RetrievalConfig,
}

impl HybridIndex {
    /// Build the lexical (and, when a backend is supplied, semantic)
    /// index over a chunk set. An empty chunk set is an error so callers
    /// can distinguish "nothing indexed" from "nothing found". A backend
    /// that fails to encode degrades the index to lexical-only.
    pub fn build(
        chunks: Vec<Chunk>,
        domain: Domain,
        embedder: Option<&mut dyn Embedder>,
        config: &RetrievalConfig,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let representations: Vec<String> =
            chunks.iter().map(weighted_text).collect();
        let tokenized: Vec<Vec<String>> = representations
            .iter()
            .map(|text| bm25::tokenize(text))
            .collect();
        let bm25 = Bm25Index::build(&tokenized, domain.profile().bm25);

        let embeddings = match embedder {
            Some(backend) => match backend.encode(&representations) {
                Ok(vectors) => {
                    debug!(
                        chunks = vectors.len(),
                        "encoded chunk representations"
                    );
                    Some(vectors)
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "embedding backend unavailable, falling back to \
                         lexical-only mode"
                    );
                    None
                }
            },
            None => {
                info!("no embedding backend, lexical-only mode");
                None
            }
        };

        Ok(Self {
            chunks,
            domain,
            bm25,
            embeddings,
            config: *config,
        })
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// True when the index carries dense vectors alongside BM25.
    pub fn has_embeddings(&self) -> bool {
        self.embeddings.is_some()
    }

    /// Run a hybrid search and return the top-k diverse results.
    ///
    /// The raw query is `persona + task`, expanded with the domain's
    /// synonym vocabulary before scoring. BM25 scores are rescaled to
    /// `[0, 1]` by the maximum (skipped when all-zero); cosine
    /// similarities are clamped to `[0, 1]`; the two are fused by the
    /// domain's weights. Without embeddings the hybrid score *is* the
    /// lexical score and `semantic_score` stays absent.
    pub fn search(
        &self,
        request: &SearchRequest,
        embedder: Option<&mut dyn Embedder>,
    ) -> Result<Vec<RetrievalResult>> {
        let query = format!("{} {}", request.persona, request.task)
            .trim()
            .to_string();
        let enhanced_query = enhance_query(&query, self.domain);

        let query_tokens = bm25::tokenize(&enhanced_query);
        let mut lexical = self.bm25.scores(&query_tokens);
        let max_lexical =
            lexical.iter().cloned().fold(0.0f32, f32::max);
        if max_lexical > 0.0 {
            for score in &mut lexical {
                *score /= max_lexical;
            }
        }

        let semantic = self.semantic_scores(&enhanced_query, embedder)?;

        let hybrid: Vec<f32> = match &semantic {
            Some(similarities) => {
                let weights = self.domain.profile().weights;
                debug!(
                    lexical = weights.lexical,
                    semantic = weights.semantic,
                    "hybrid search"
                );
                lexical
                    .iter()
                    .zip(similarities)
                    .map(|(lex, sem)| {
                        weights.lexical * lex + weights.semantic * sem
                    })
                    .collect()
            }
            None => {
                debug!("lexical-only search");
                lexical.clone()
            }
        };

        let selected = diverse_top_k(
            &hybrid,
            &self.chunks,
            request.k,
            self.config.diversity_threshold,
        );

        Ok(selected
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let chunk = &self.chunks[index];
                RetrievalResult {
                    document: chunk.pdf_name.clone(),
                    section_title: chunk.heading.clone(),
                    refined_text: chunk.content.clone(),
                    page_number: chunk.page_number,
                    rank: position + 1,
                    hybrid_score: hybrid[index],
                    lexical_score: lexical[index],
                    semantic_score: semantic
                        .as_ref()
                        .map(|scores| scores[index]),
                    query: query.clone(),
                    enhanced_query: enhanced_query.clone(),
                }
            })
            .collect())
    }

    /// Cosine similarities of the enhanced query against every chunk
    /// vector, clamped to `[0, 1]`. `None` when the index is
    /// lexical-only or no backend was supplied for the query side.
    fn semantic_scores(
        &self,
        enhanced_query: &str,
        embedder: Option<&mut dyn Embedder>,
    ) -> Result<Option<Vec<f32>>> {
        let Some(chunk_vectors) = &self.embeddings else {
            return Ok(None);
        };
        let Some(backend) = embedder else {
            warn!("index has embeddings but no backend was supplied");
            return Ok(None);
        };

        let mut encoded =
            backend.encode(&[enhanced_query.to_string()])?;
        if encoded.is_empty() {
            return Err(Error::Model(
                "backend returned no query embedding".to_string(),
            ));
        }
        let query_vector = encoded.remove(0);

        Ok(Some(
            chunk_vectors
                .iter()
                .map(|vector| {
                    cosine_similarity(&query_vector, vector)
                        .clamp(0.0, 1.0)
                })
                .collect(),
        ))
    }
}

/// Text representation used for both indexing and scoring: the heading
/// twice (headings matter more than body prose), the content, then any
/// filename-keyed enrichment keywords.
fn weighted_text(chunk: &Chunk) -> String {
    let mut text = format!(
        "{} {} {}",
        chunk.heading, chunk.heading, chunk.content
    );

    let filename = chunk.pdf_name.to_lowercase();
    for (needles, keywords) in FILENAME_ENRICHMENT {
        if needles.iter().any(|needle| filename.contains(needle)) {
            text.push(' ');
            text.push_str(keywords);
            break;
        }
    }

    text
}

/// Append the domain's synonym lists for every trigger term present in
/// the query. Scoring sees the expanded text; both forms are echoed on
/// results.
fn enhance_query(query: &str, domain: Domain) -> String {
    let lower = query.to_lowercase();
    let mut enhanced = query.to_string();
    for (trigger, synonyms) in domain.profile().expansions {
        if lower.contains(trigger) {
            enhanced.push(' ');
            enhanced.push_str(&synonyms.join(" "));
        }
    }
    enhanced
}

/// Greedy diverse selection: repeatedly take the highest-scoring
/// remaining chunk (first index wins ties), then drop every remaining
/// chunk from the same document or with a too-similar heading.
fn diverse_top_k(
    scores: &[f32],
    chunks: &[Chunk],
    k: usize,
    diversity_threshold: f64,
) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..scores.len()).collect();
    let mut selected = Vec::new();

    while selected.len() < k && !remaining.is_empty() {
        let mut best = remaining[0];
        for &candidate in &remaining[1..] {
            if scores[candidate] > scores[best] {
                best = candidate;
            }
        }
        selected.push(best);

        let picked = &chunks[best];
        remaining.retain(|&candidate| {
            candidate != best
                && chunks[candidate].pdf_name != picked.pdf_name
                && heading_similarity(
                    &chunks[candidate].heading,
                    &picked.heading,
                ) <= diversity_threshold
        });
    }

    selected
}

fn heading_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}
