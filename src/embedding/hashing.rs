//! Feature-hashing embedder
//!
//! Lowercased word unigrams and bigrams are hashed (FNV-1a) into signed
//! buckets and the result is L2-normalized. Vectors depend only on the text
//! and the dimension, so runs are reproducible without any model files.

use crate::embedding::{l2_normalize, Embedder, Embedding};
use crate::errors::{NewsdeskError, Result};

pub const DEFAULT_DIMENSION: usize = 384;

/// Stand-in feature for text with no tokens, keeps the vector unit length
const EMPTY_TEXT_FEATURE: &str = "\u{0}<empty>";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embedder
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(NewsdeskError::ConfigError(
                "hashing dimension must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            model_id: format!("fnv1a-hashing-{}", dimension),
        })
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        let mut vector = vec![0.0f32; self.dimension];
        if tokens.is_empty() {
            self.add_feature(&mut vector, EMPTY_TEXT_FEATURE);
        } else {
            for token in &tokens {
                self.add_feature(&mut vector, token);
            }
            for pair in tokens.windows(2) {
                self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]));
            }
        }

        l2_normalize(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str) {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

impl Embedder for HashingEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}
