// Sentence embeddings computed locally with a BERT-family model via Candle
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::embedding::{check_embeddings, l2_normalize, Embedder, Embedding, EmbeddingConfig};
use crate::errors::{NewsdeskError, Result};

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Token limit the sentence-transformers checkpoints were trained with
const MAX_SEQUENCE_LENGTH: usize = 256;

/// Embedding engine running a sentence-transformers checkpoint on CPU
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_id: String,
    dimension: usize,
    batch_size: usize,
}

fn load_error(what: &str, err: impl std::fmt::Display) -> NewsdeskError {
    NewsdeskError::EncodingError(format!("{}: {}", what, err))
}

impl CandleEmbedder {
    /// Create new embedding engine (downloads model on first use)
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        // Kernel thread count must be fixed before the first tensor op so
        // reductions happen in the same order on every run
        std::env::set_var("RAYON_NUM_THREADS", config.threads.to_string());
        let device = Device::Cpu;

        let api = Api::new().map_err(|e| load_error("failed to create HuggingFace API client", e))?;
        let repo = api.repo(Repo::new(config.model_id.clone(), RepoType::Model));

        let config_path = repo
            .get("config.json")
            .map_err(|e| load_error("failed to download model config", e))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| load_error("failed to download tokenizer", e))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| load_error("failed to download model weights", e))?;

        let config_contents = std::fs::read_to_string(config_path)?;
        let bert_config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| load_error("failed to parse model config", e))?;
        let raw_config: serde_json::Value = serde_json::from_str(&config_contents)?;
        let dimension = raw_config
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| load_error("model config", "missing hidden_size"))?
            as usize;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| load_error("failed to load tokenizer", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| load_error("failed to configure truncation", e))?;

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = BertModel::load(vb, &bert_config)?;

        info!(
            model = %config.model_id,
            dimension,
            threads = config.threads,
            "embedding model loaded"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            model_id: config.model_id.clone(),
            dimension,
            batch_size: config.batch_size,
        })
    }

    /// Run one padded batch through the model
    fn encode_chunk(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| NewsdeskError::EncodingError(format!("tokenization failed: {}", e)))?;

        let max_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let batch_size = texts.len();

        // Pad sequences
        let mut flat_ids = vec![0u32; batch_size * max_len];
        let mut flat_mask = vec![0u32; batch_size * max_len];
        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            flat_ids[i * max_len..i * max_len + ids.len()].copy_from_slice(ids);
            flat_mask[i * max_len..i * max_len + mask.len()].copy_from_slice(mask);
        }

        let token_ids = Tensor::from_vec(flat_ids, (batch_size, max_len), &self.device)?;
        let attention_mask = Tensor::from_vec(flat_mask, (batch_size, max_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = Self::mean_pool(&hidden, &attention_mask)?;

        let mut rows = pooled.to_vec2::<f32>()?;
        for row in rows.iter_mut() {
            l2_normalize(row);
        }
        Ok(rows)
    }

    /// Mean pooling with attention mask
    fn mean_pool(embeddings: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let mask_expanded = attention_mask
            .unsqueeze(2)?
            .expand(embeddings.shape())?
            .to_dtype(embeddings.dtype())?;

        let sum_embeddings = (embeddings * &mask_expanded)?.sum(1)?;
        let sum_mask = mask_expanded.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum_embeddings.broadcast_div(&sum_mask)?)
    }
}

impl Embedder for CandleEmbedder {
    fn encode(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch, chunk) in texts.chunks(self.batch_size).enumerate() {
            debug!(batch, size = chunk.len(), "encoding batch");
            embeddings.extend(self.encode_chunk(chunk)?);
        }

        check_embeddings(&embeddings, texts.len(), self.dimension)?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::dot;

    fn engine() -> CandleEmbedder {
        CandleEmbedder::new(&EmbeddingConfig::default()).expect("Failed to create engine")
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_embedding_dimension() {
        assert_eq!(engine().dimension(), 384);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_encode_is_unit_length_and_ordered() {
        let engine = engine();
        let texts = ["Flood warning for the coast", "", "Cricket final tonight"];
        let embeddings = engine.encode(&texts).expect("Failed to embed batch");
        assert_eq!(embeddings.len(), 3);
        for e in &embeddings {
            assert!((dot(e, e) - 1.0).abs() < 1e-4);
        }

        let single = engine.encode(&texts[2..]).expect("Failed to embed");
        assert!((dot(&single[0], &embeddings[2]) - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore] // Integration test - requires model download
    fn test_encode_empty_batch() {
        assert!(engine().encode(&[]).expect("Failed to embed empty batch").is_empty());
    }
}
