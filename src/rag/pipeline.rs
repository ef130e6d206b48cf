// End-to-end question answering: retrieve -> build prompt -> complete
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::Result;
use crate::rag::retrieval::{RetrievalConfig, RetrievalIndex, RetrievedContext};
use crate::rag::synthesizer::AnswerSynthesizer;
use crate::telemetry::{Stage, TelemetryCollector, TelemetryEvent};

/// Synthesized answer with the documents that grounded it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub query: String,
    pub text: String,
    pub context: RetrievedContext,
}

/// Question-answering pipeline over a shared read-only index
pub struct RagPipeline {
    index: Arc<RetrievalIndex>,
    synthesizer: AnswerSynthesizer,
    config: RetrievalConfig,
    telemetry: TelemetryCollector,
}

impl RagPipeline {
    /// Create pipeline; rejects `top_k == 0`
    pub fn new(
        index: Arc<RetrievalIndex>,
        synthesizer: AnswerSynthesizer,
        config: RetrievalConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            index,
            synthesizer,
            config,
            telemetry: TelemetryCollector::new(),
        })
    }

    /// Report stage timings to a shared collector
    pub fn with_telemetry(mut self, telemetry: TelemetryCollector) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn index(&self) -> &RetrievalIndex {
        &self.index
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Answer with the configured `top_k`
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        self.answer_with_k(query, self.config.top_k).await
    }

    /// Answer grounded in the top `k` documents
    pub async fn answer_with_k(&self, query: &str, k: usize) -> Result<Answer> {
        let started = Instant::now();
        let context = self.index.query(query, k)?;
        self.telemetry.record_stage(Stage::Retrieval, started.elapsed());

        let started = Instant::now();
        let outcome = self.synthesizer.synthesize(query, &context).await;
        self.telemetry.record_stage(Stage::Completion, started.elapsed());
        self.telemetry.record(TelemetryEvent::QueryAnswered {
            retrieved: context.len(),
            success: outcome.is_ok(),
            timestamp: Instant::now(),
        });

        let text = outcome?;
        info!(k, retrieved = context.len(), "question answered");
        Ok(Answer {
            query: query.to_string(),
            text,
            context,
        })
    }
}
