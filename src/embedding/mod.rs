//! Text embedding
//!
//! One `Embedder` is constructed at startup and shared (as `Arc<dyn Embedder>`)
//! by the clustering pipeline and the retrieval index.
//!
//! Components:
//! - Candle engine: local BERT-family sentence encoder
//! - Hashing embedder: deterministic bag-of-words vectors, no model download

pub mod engine;
pub mod hashing;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{NewsdeskError, Result};

pub use engine::CandleEmbedder;
pub use hashing::HashingEmbedder;

/// Unit-normalized embedding vector
pub type Embedding = Vec<f32>;

/// Floor applied to vector norms before dividing
pub const NORM_EPSILON: f32 = 1e-12;

/// Converts text into unit-normalized vectors
///
/// Output order matches input order. Empty strings still map to a defined
/// vector; callers that care whether text was present must track that
/// themselves.
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Length of every vector this embedder produces
    fn dimension(&self) -> usize;

    /// Identifier of the model version in use
    fn model_id(&self) -> &str;
}

/// Which embedding implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Transformer sentence encoder run through candle
    Candle,
    /// Feature hashing, offline
    Hashing,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Hugging Face model repository for the candle backend
    pub model_id: String,
    /// Texts per forward pass
    pub batch_size: usize,
    /// CPU threads for the candle kernels
    pub threads: usize,
    /// Vector length for the hashing backend
    pub hashing_dim: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Candle,
            model_id: engine::DEFAULT_MODEL_ID.to_string(),
            batch_size: 32,
            threads: 1,
            hashing_dim: hashing::DEFAULT_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(NewsdeskError::ConfigError(
                "embedding.batch_size must be greater than 0".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(NewsdeskError::ConfigError(
                "embedding.threads must be greater than 0".to_string(),
            ));
        }
        if self.hashing_dim == 0 {
            return Err(NewsdeskError::ConfigError(
                "embedding.hashing_dim must be greater than 0".to_string(),
            ));
        }
        if self.backend == EmbeddingBackend::Candle && self.model_id.trim().is_empty() {
            return Err(NewsdeskError::ConfigError(
                "embedding.model_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Construct the configured embedder
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    config.validate()?;
    match config.backend {
        EmbeddingBackend::Candle => Ok(Arc::new(CandleEmbedder::new(config)?)),
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::new(config.hashing_dim)?)),
    }
}

/// Scale a vector to unit length in place
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt().max(NORM_EPSILON);
    for v in vector.iter_mut() {
        *v /= norm;
    }
}

/// Dot product; cosine similarity for unit vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Reject embedder output that downstream math cannot use
pub fn check_embeddings(
    embeddings: &[Embedding],
    expected_count: usize,
    dimension: usize,
) -> Result<()> {
    if embeddings.len() != expected_count {
        return Err(NewsdeskError::EncodingError(format!(
            "expected {} embeddings, got {}",
            expected_count,
            embeddings.len()
        )));
    }

    for (i, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != dimension {
            return Err(NewsdeskError::EncodingError(format!(
                "embedding {} has dimension {}, expected {}",
                i,
                embedding.len(),
                dimension
            )));
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(NewsdeskError::EncodingError(format!(
                "embedding {} contains non-finite values",
                i
            )));
        }
    }

    debug!(count = expected_count, dimension, "embeddings checked");
    Ok(())
}
