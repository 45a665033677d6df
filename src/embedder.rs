//! Optional dense-embedding backend.
//!
//! Retrieval works lexical-only; when an [`Embedder`] is supplied, chunk
//! representations and queries are additionally encoded to dense vectors
//! and scored by cosine similarity. [`EmbeddingModel`] is the bundled
//! backend: a ColBERT encoder loaded lazily on first use, with its
//! token-level output mean-pooled down to one vector per text. Callers
//! construct it once and pass it to both index build and search.

use candle_core::Device;
use pylate_rs::ColBERT;

use crate::error::{Error, Result};

pub const DEFAULT_MODEL_ID: &str = "lightonai/GTE-ModernColBERT-v1";
pub const MODEL_ENV_VAR: &str = "DOCSIFT_MODEL";

/// Anything that can turn a batch of texts into one dense vector each.
pub trait Embedder {
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Cosine similarity of two vectors; 0.0 for mismatched lengths or a
/// zero-magnitude side.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Select the best available compute device.
///
/// Uses CUDA when compiled with the `cuda` feature, Metal when compiled
/// with the `metal` feature, and falls back to CPU otherwise.
fn default_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            return device;
        }
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            return device;
        }
    }

    Device::Cpu
}

/// Lazily-loaded embedding model.
pub struct EmbeddingModel {
    model: Option<ColBERT>,
    model_id: String,
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel {
    /// Creates a new `EmbeddingModel`. The model ID is resolved from:
    /// 1. The `DOCSIFT_MODEL` environment variable, if set
    /// 2. Otherwise, the default model (`lightonai/GTE-ModernColBERT-v1`)
    ///
    /// The model is not loaded until the first call to `encode`.
    pub fn new() -> Self {
        let model_id = std::env::var(MODEL_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());

        Self {
            model: None,
            model_id,
        }
    }

    /// Creates an `EmbeddingModel` with an explicit model ID, bypassing
    /// environment variable resolution.
    pub fn with_model_id(model_id: String) -> Self {
        Self {
            model: None,
            model_id,
        }
    }

    /// Returns the model ID that will be (or has been) loaded.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Returns `true` if the model has already been loaded into memory.
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    fn ensure_loaded(&mut self) -> Result<&mut ColBERT> {
        if self.model.is_none() {
            let device = default_device();
            let colbert: ColBERT = ColBERT::from(&self.model_id)
                .with_device(device)
                .try_into()
                .map_err(|e| {
                    Error::Model(format!(
                        "failed to load model {}: {e}",
                        self.model_id
                    ))
                })?;
            self.model = Some(colbert);
        }

        Ok(self.model.as_mut().expect("model loaded above"))
    }
}

impl Embedder for EmbeddingModel {
    /// Encode texts and mean-pool the token-level embeddings into one
    /// dense vector per text.
    fn encode(&mut self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.ensure_loaded()?;
        let embeddings = model.encode(texts, false).map_err(|e| {
            Error::Model(format!("failed to encode batch: {e}"))
        })?;

        // embeddings shape: [batch_size, num_tokens, dimension]
        let pooled = embeddings.mean(1).map_err(|e| {
            Error::Model(format!("failed to pool token embeddings: {e}"))
        })?;
        pooled.to_vec2::<f32>().map_err(|e| {
            Error::Model(format!("failed to convert embeddings: {e}"))
        })
    }
}
