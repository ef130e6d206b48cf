// Per-cluster digest: representative headline, sources, size
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::clustering::greedy::Cluster;
use crate::types::Document;

/// Source label used when a document does not name one
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Digest of one cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    /// Title of the seed document
    pub title: String,
    /// Category of the seed document
    pub category: Option<String>,
    /// Distinct outlets that ran the story
    pub sources: BTreeSet<String>,
    /// Number of documents in the cluster
    pub frequency: usize,
    pub members: Vec<usize>,
}

/// Summaries sorted by descending frequency, then ascending cluster id
pub fn summarize(documents: &[Document], clusters: &[Cluster]) -> Vec<ClusterSummary> {
    let mut summaries: Vec<ClusterSummary> = clusters
        .iter()
        .filter(|c| !c.is_empty())
        .map(|cluster| {
            let seed = &documents[cluster.seed()];
            let sources = cluster
                .members
                .iter()
                .map(|&i| {
                    documents[i]
                        .source
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
                })
                .collect();

            ClusterSummary {
                cluster_id: cluster.id,
                title: seed.title.clone(),
                category: seed.category.clone(),
                sources,
                frequency: cluster.len(),
                members: cluster.members.clone(),
            }
        })
        .collect();

    // Stable sort keeps discovery order among equal sizes
    summaries.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    summaries
}
