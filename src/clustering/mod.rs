// Near-duplicate clustering
//
// Components:
// - Similarity: combined title/body pairwise similarity matrix
// - Greedy: seed-first threshold partitioning over that matrix
// - Engine: embed -> matrix -> greedy -> cluster_id assignment
// - Summary: per-cluster representative title, sources and size

pub mod similarity;
pub mod greedy;
pub mod engine;
pub mod summary;

// Re-export key types
pub use engine::{ClusteringConfig, ClusteringEngine, ClusteringReport};
pub use greedy::{cluster_assignments, Cluster, GreedyClusterer, DEFAULT_THRESHOLD};
pub use similarity::{combined_similarity, pairwise_similarity, SimilarityMatrix};
pub use summary::{summarize, ClusterSummary};
