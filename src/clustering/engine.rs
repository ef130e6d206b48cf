// Clustering pipeline: embed titles and bodies, build the combined matrix,
// run the greedy scan, then stamp cluster ids onto the documents
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clustering::greedy::{cluster_assignments, Cluster, GreedyClusterer, DEFAULT_THRESHOLD};
use crate::clustering::similarity::{combined_similarity, SimilarityMatrix};
use crate::clustering::summary::{summarize, ClusterSummary};
use crate::embedding::{check_embeddings, Embedder};
use crate::errors::{NewsdeskError, Result};
use crate::telemetry::{Stage, TelemetryCollector, TelemetryEvent};
use crate::types::{has_content_mask, Document};

/// Clustering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Minimum seed similarity (inclusive) for joining a cluster
    pub threshold: f32,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<()> {
        GreedyClusterer::new(self.threshold).map(|_| ())
    }
}

/// Outcome of one clustering run
#[derive(Debug, Clone)]
pub struct ClusteringReport {
    /// Clusters in discovery order; index equals cluster id
    pub clusters: Vec<Cluster>,
    pub summaries: Vec<ClusterSummary>,
    pub elapsed: Duration,
}

impl ClusteringReport {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}

/// End-to-end clustering over an in-memory corpus
pub struct ClusteringEngine {
    embedder: Arc<dyn Embedder>,
    clusterer: GreedyClusterer,
    telemetry: TelemetryCollector,
}

impl ClusteringEngine {
    /// Create an engine; rejects an out-of-range threshold before any work
    pub fn new(embedder: Arc<dyn Embedder>, config: &ClusteringConfig) -> Result<Self> {
        Ok(Self {
            embedder,
            clusterer: GreedyClusterer::new(config.threshold)?,
            telemetry: TelemetryCollector::new(),
        })
    }

    /// Report stage timings to a shared collector
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.clusterer.threshold()
    }

    /// Combined title/body similarity for the corpus
    pub fn similarity_matrix(&self, documents: &[Document]) -> Result<SimilarityMatrix> {
        let titles: Vec<&str> = documents.iter().map(|d| d.title.as_str()).collect();
        let bodies: Vec<&str> = documents.iter().map(|d| d.body.as_str()).collect();
        let dimension = self.embedder.dimension();

        let started = Instant::now();
        let title_embeddings = self.embedder.encode(&titles)?;
        check_embeddings(&title_embeddings, documents.len(), dimension)?;
        let body_embeddings = self.embedder.encode(&bodies)?;
        check_embeddings(&body_embeddings, documents.len(), dimension)?;
        self.telemetry.record_stage(Stage::Embedding, started.elapsed());

        let started = Instant::now();
        let has_content = has_content_mask(documents);
        let matrix = combined_similarity(&title_embeddings, &body_embeddings, &has_content)?;
        self.telemetry.record_stage(Stage::Similarity, started.elapsed());

        Ok(matrix)
    }

    /// Cluster the corpus and assign `cluster_id` to every document
    ///
    /// Documents are only modified once every stage has succeeded.
    pub fn run(&self, documents: &mut [Document]) -> Result<ClusteringReport> {
        let run_started = Instant::now();
        let matrix = self.similarity_matrix(documents)?;

        let started = Instant::now();
        let clusters = self.clusterer.cluster(&matrix);
        self.telemetry.record_stage(Stage::Clustering, started.elapsed());

        let assignments = cluster_assignments(&clusters, documents.len()).ok_or_else(|| {
            NewsdeskError::EncodingError("clusters do not partition the corpus".to_string())
        })?;
        for (document, cluster_id) in documents.iter_mut().zip(assignments) {
            document.cluster_id = Some(cluster_id);
        }

        self.telemetry.record(TelemetryEvent::ClustersFormed {
            clusters: clusters.len(),
            documents: documents.len(),
            timestamp: Instant::now(),
        });

        let summaries = summarize(documents, &clusters);
        let elapsed = run_started.elapsed();
        info!(
            documents = documents.len(),
            clusters = clusters.len(),
            threshold = self.clusterer.threshold(),
            elapsed_ms = elapsed.as_millis() as u64,
            "clustering complete"
        );

        Ok(ClusteringReport {
            clusters,
            summaries,
            elapsed,
        })
    }
}
