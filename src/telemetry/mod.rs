//! Telemetry system for newsdesk
//!
//! Collects pipeline events (documents loaded, stage timings, clusters formed,
//! questions answered) and aggregates them into run statistics.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Pipeline stages that report timings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Embedding,
    Similarity,
    Clustering,
    IndexBuild,
    Retrieval,
    Completion,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Embedding => "embedding",
            Stage::Similarity => "similarity",
            Stage::Clustering => "clustering",
            Stage::IndexBuild => "index_build",
            Stage::Retrieval => "retrieval",
            Stage::Completion => "completion",
        }
    }
}

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    DocumentsLoaded {
        accepted: usize,
        dropped: usize,
        timestamp: Instant,
    },
    StageCompleted {
        stage: Stage,
        duration_ms: u64,
        timestamp: Instant,
    },
    ClustersFormed {
        clusters: usize,
        documents: usize,
        timestamp: Instant,
    },
    QueryAnswered {
        retrieved: usize,
        success: bool,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub documents_loaded: usize,
    pub documents_dropped: usize,
    pub clusters_formed: usize,
    pub documents_clustered: usize,
    pub queries_answered: usize,
    pub queries_failed: usize,
    /// Accumulated milliseconds per stage
    pub stage_ms: BTreeMap<Stage, u64>,
}

/// Telemetry collector, cheap to clone and share
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while recording leaves counters usable
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::DocumentsLoaded { accepted, dropped, .. } => {
                    stats.documents_loaded += accepted;
                    stats.documents_dropped += dropped;
                }
                TelemetryEvent::StageCompleted { stage, duration_ms, .. } => {
                    *stats.stage_ms.entry(*stage).or_insert(0) += duration_ms;
                }
                TelemetryEvent::ClustersFormed { clusters, documents, .. } => {
                    stats.clusters_formed += clusters;
                    stats.documents_clustered += documents;
                }
                TelemetryEvent::QueryAnswered { success, .. } => {
                    if *success {
                        stats.queries_answered += 1;
                    } else {
                        stats.queries_failed += 1;
                    }
                }
            }
        }

        lock(&self.events).push(event);
    }

    /// Record how long a stage took
    pub fn record_stage(&self, stage: Stage, elapsed: Duration) {
        self.record(TelemetryEvent::StageCompleted {
            stage,
            duration_ms: elapsed.as_millis() as u64,
            timestamp: Instant::now(),
        });
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple telemetry display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: crate::cli::Verbosity,
}

impl TelemetryDisplay {
    /// Create a new display
    pub fn new(collector: TelemetryCollector, verbosity: crate::cli::Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if !self.should_show_details() {
            return;
        }

        let stats = self.collector.get_stats();
        println!("\nRun Summary");
        println!("─────────────────────────────────────");
        println!("Duration:          {:?}", self.collector.elapsed());
        println!("Documents loaded:  {}", stats.documents_loaded);
        println!("Documents dropped: {}", stats.documents_dropped);
        println!("Clusters formed:   {}", stats.clusters_formed);
        if stats.queries_answered + stats.queries_failed > 0 {
            println!("Queries answered:  {}", stats.queries_answered);
            println!("Queries failed:    {}", stats.queries_failed);
        }
        for (stage, ms) in &stats.stage_ms {
            println!("  {:<16} {} ms", stage.as_str(), ms);
        }
        println!();
    }

    /// Check if should show detailed output
    pub fn should_show_details(&self) -> bool {
        self.verbosity.show_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_creation() {
        let collector = TelemetryCollector::new();
        assert_eq!(collector.event_count(), 0);
        assert_eq!(collector.get_stats().clusters_formed, 0);
    }

    #[test]
    fn test_documents_loaded_accumulates() {
        let collector = TelemetryCollector::new();
        collector.record(TelemetryEvent::DocumentsLoaded {
            accepted: 10,
            dropped: 2,
            timestamp: Instant::now(),
        });

        let stats = collector.get_stats();
        assert_eq!(stats.documents_loaded, 10);
        assert_eq!(stats.documents_dropped, 2);
        assert_eq!(collector.event_count(), 1);
    }

    #[test]
    fn test_stage_timings_sum_per_stage() {
        let collector = TelemetryCollector::new();
        collector.record_stage(Stage::Embedding, Duration::from_millis(40));
        collector.record_stage(Stage::Embedding, Duration::from_millis(60));
        collector.record_stage(Stage::Similarity, Duration::from_millis(5));

        let stats = collector.get_stats();
        assert_eq!(stats.stage_ms[&Stage::Embedding], 100);
        assert_eq!(stats.stage_ms[&Stage::Similarity], 5);
    }

    #[test]
    fn test_query_outcomes() {
        let collector = TelemetryCollector::new();
        for success in [true, true, false] {
            collector.record(TelemetryEvent::QueryAnswered {
                retrieved: 3,
                success,
                timestamp: Instant::now(),
            });
        }

        let stats = collector.get_stats();
        assert_eq!(stats.queries_answered, 2);
        assert_eq!(stats.queries_failed, 1);
    }

    #[test]
    fn test_recent_events() {
        let collector = TelemetryCollector::new();
        for i in 0..10 {
            collector.record(TelemetryEvent::ClustersFormed {
                clusters: i,
                documents: i,
                timestamp: Instant::now(),
            });
        }
        assert_eq!(collector.recent_events(3).len(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let collector = TelemetryCollector::new();
        let clone = collector.clone();
        clone.record_stage(Stage::Retrieval, Duration::from_millis(1));
        assert_eq!(collector.event_count(), 1);
    }
}
