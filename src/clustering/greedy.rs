// Seed-first greedy clustering over a precomputed similarity matrix
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clustering::similarity::SimilarityMatrix;
use crate::errors::{NewsdeskError, Result};

/// Default inclusive similarity threshold for joining a cluster
pub const DEFAULT_THRESHOLD: f32 = 0.75;

/// Disjoint group of document indices, in the order they joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Position in discovery order
    pub id: usize,
    /// Corpus indices; the first entry is the seed
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn seed(&self) -> usize {
        self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Greedy clusterer
///
/// Each unvisited document, taken in corpus order, seeds a cluster and pulls
/// in every still-unvisited document whose similarity *to the seed* is at
/// least the threshold. Members are never compared with each other, so two
/// members of one cluster may be less similar than the threshold.
#[derive(Debug, Clone, Copy)]
pub struct GreedyClusterer {
    threshold: f32,
}

impl GreedyClusterer {
    /// Create a clusterer; the threshold must lie in [-1, 1]
    pub fn new(threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(NewsdeskError::ConfigError(format!(
                "clustering threshold must be within [-1, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Partition every document covered by `matrix`
    pub fn cluster(&self, matrix: &SimilarityMatrix) -> Vec<Cluster> {
        let n = matrix.len();
        let mut visited = vec![false; n];
        let mut clusters = Vec::new();

        for seed in 0..n {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            let mut members = vec![seed];

            let similarities = matrix.row(seed);
            for candidate in 0..n {
                if !visited[candidate] && similarities[candidate] >= self.threshold {
                    visited[candidate] = true;
                    members.push(candidate);
                }
            }

            debug!(cluster = clusters.len(), seed, size = members.len(), "cluster formed");
            clusters.push(Cluster {
                id: clusters.len(),
                members,
            });
        }

        clusters
    }
}

impl Default for GreedyClusterer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Cluster id of every document, indexed by corpus position
///
/// Returns `None` if the clusters do not cover `size` documents exactly once.
pub fn cluster_assignments(clusters: &[Cluster], size: usize) -> Option<Vec<usize>> {
    let mut assignment = vec![None; size];
    for cluster in clusters {
        for &member in &cluster.members {
            match assignment.get_mut(member) {
                Some(slot) if slot.is_none() => *slot = Some(cluster.id),
                _ => return None,
            }
        }
    }
    assignment.into_iter().collect()
}
