// Exact top-k cosine retrieval over one embedding per document
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::embedding::{check_embeddings, dot, Embedder, Embedding};
use crate::errors::{NewsdeskError, Result};
use crate::types::Document;

/// Number of documents retrieved per question unless told otherwise
pub const DEFAULT_TOP_K: usize = 3;

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of results to retrieve
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<()> {
        validate_k(self.top_k)
    }
}

fn validate_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(NewsdeskError::ConfigError(
            "top_k must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Retrieved document with its similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Position in the indexed corpus
    pub index: usize,
    pub document: Document,
    pub score: f32,
}

/// Ranked documents grounding one answer
pub type RetrievedContext = Vec<RetrievedDocument>;

/// Read-only nearest-neighbour index
///
/// Built once; queries take `&self`, so an `Arc<RetrievalIndex>` can serve
/// concurrent callers without locking. Rebuilding re-embeds everything.
pub struct RetrievalIndex {
    embedder: Arc<dyn Embedder>,
    documents: Vec<Document>,
    embeddings: Vec<Embedding>,
}

impl RetrievalIndex {
    /// Embed `"{title} {body}"` of every document
    pub fn build(embedder: Arc<dyn Embedder>, documents: Vec<Document>) -> Result<Self> {
        let started = Instant::now();
        let texts: Vec<String> = documents.iter().map(Document::retrieval_text).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let embeddings = embedder.encode(&refs)?;
        check_embeddings(&embeddings, documents.len(), embedder.dimension())?;

        info!(
            documents = documents.len(),
            model = embedder.model_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "retrieval index built"
        );

        Ok(Self {
            embedder,
            documents,
            embeddings,
        })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Top `min(k, len)` documents by descending cosine similarity
    ///
    /// Equal scores keep corpus order.
    pub fn query(&self, text: &str, k: usize) -> Result<RetrievedContext> {
        validate_k(k)?;
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self
            .embedder
            .encode(&[text])?
            .pop()
            .ok_or_else(|| NewsdeskError::EncodingError("no embedding for query".to_string()))?;
        check_embeddings(
            std::slice::from_ref(&query_embedding),
            1,
            self.embedder.dimension(),
        )?;

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (i, dot(&query_embedding, e)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k);

        debug!(k, returned = scored.len(), "retrieval query");

        Ok(scored
            .into_iter()
            .map(|(index, score)| RetrievedDocument {
                index,
                document: self.documents[index].clone(),
                score,
            })
            .collect())
    }
}
