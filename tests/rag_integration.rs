//! Integration tests for question answering: index -> retrieve -> prompt -> completion

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockito::{Matcher, Server};
use newsdesk::embedding::{Embedder, HashingEmbedder};
use newsdesk::generation::{
    CompletionProvider, CompletionRequest, GenerationConfig, OpenAiProvider,
};
use newsdesk::rag::{AnswerSynthesizer, RagPipeline, RetrievalConfig, RetrievalIndex};
use newsdesk::telemetry::TelemetryCollector;
use newsdesk::types::Document;
use newsdesk::{NewsdeskError, Result};
use serde_json::json;

/// Records every prompt and replies with a fixed answer
struct RecordingProvider {
    prompts: Mutex<Vec<String>>,
    reply: String,
}

impl RecordingProvider {
    fn new(reply: &str) -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
            reply: reply.to_string(),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for RecordingProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn corpus() -> Vec<Document> {
    vec![
        Document::new(
            "Cyclone crosses Queensland coast",
            "Wind gusts topped two hundred kilometres",
        )
        .with_source("ABC"),
        Document::new("Treasurer unveils budget surplus", "Spending restrained").with_source("SBS"),
        Document::new("Matildas qualify for semifinal", "Penalty shootout drama")
            .with_source("Guardian"),
        Document::new("Wheat harvest breaks records", "Farmers report bumper yields")
            .with_source("SMH"),
        Document::new("Telescope spots distant galaxy", "Light from early universe")
            .with_source("News.com.au"),
    ]
}

fn index() -> Arc<RetrievalIndex> {
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(1024).unwrap());
    Arc::new(RetrievalIndex::build(embedder, corpus()).unwrap())
}

fn pipeline(provider: Arc<dyn CompletionProvider>, top_k: usize) -> RagPipeline {
    let synthesizer = AnswerSynthesizer::new(provider, &GenerationConfig::default()).unwrap();
    RagPipeline::new(index(), synthesizer, RetrievalConfig { top_k }).unwrap()
}

#[test]
fn test_exact_title_query_ranks_that_article_first() {
    let index = index();
    let hits = index.query("Wheat harvest breaks records", 1).unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].index, 3);
    assert_eq!(hits[0].document.title, "Wheat harvest breaks records");
}

#[test]
fn test_k_is_capped_by_corpus_size() {
    let index = index();

    let three = index.query("budget surplus", 3).unwrap();
    assert_eq!(three.len(), 3);
    assert_eq!(three[0].index, 1);
    assert!(three.windows(2).all(|w| w[0].score >= w[1].score));

    let all = index.query("budget surplus", 10).unwrap();
    assert_eq!(all.len(), 5);
    let mut seen: Vec<usize> = all.iter().map(|r| r.index).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_zero_k_rejected() {
    let result = index().query("anything", 0);
    assert!(matches!(result, Err(NewsdeskError::ConfigError(_))));
}

#[tokio::test]
async fn test_prompt_carries_retrieved_articles_in_rank_order() {
    let provider = Arc::new(RecordingProvider::new("  A cyclone hit Queensland.  "));
    let pipeline = pipeline(provider.clone(), 2);

    let answer = pipeline
        .answer("What happened with the cyclone in Queensland?")
        .await
        .unwrap();

    assert_eq!(answer.text, "A cyclone hit Queensland.");
    assert_eq!(answer.context.len(), 2);
    assert_eq!(answer.context[0].index, 0);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.starts_with("You're a news assistant."));
    assert!(prompt.ends_with("Question: What happened with the cyclone in Queensland?\nAnswer:"));
    assert!(prompt.contains(
        "Cyclone crosses Queensland coast Wind gusts topped two hundred kilometres"
    ));
}

#[tokio::test]
async fn test_answer_with_k_overrides_configured_k() {
    let provider = Arc::new(RecordingProvider::new("ok"));
    let pipeline = pipeline(provider, 1);

    let answer = pipeline.answer_with_k("galaxy telescope", 4).await.unwrap();
    assert_eq!(answer.context.len(), 4);
    assert_eq!(answer.context[0].index, 4);
}

#[tokio::test]
async fn test_telemetry_counts_answered_queries() {
    let telemetry = TelemetryCollector::new();
    let provider = Arc::new(RecordingProvider::new("ok"));
    let pipeline = pipeline(provider, 2).with_telemetry(telemetry.clone());

    pipeline.answer("wheat").await.unwrap();
    pipeline.answer("matildas").await.unwrap();

    let stats = telemetry.get_stats();
    assert_eq!(stats.queries_answered, 2);
    assert_eq!(stats.queries_failed, 0);
}

#[tokio::test]
async fn test_openai_round_trip_through_pipeline() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-4"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{"message": {"role": "assistant", "content": "Record wheat harvest."}}]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider: Arc<dyn CompletionProvider> =
        Arc::new(OpenAiProvider::new("test-key".to_string(), server.url(), None).unwrap());
    let pipeline = pipeline(provider, 1);

    let answer = pipeline.answer("wheat harvest").await.unwrap();
    assert_eq!(answer.text, "Record wheat harvest.");
    assert_eq!(answer.context[0].document.source.as_deref(), Some("SMH"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_service_failure_surfaces_as_retrieval_error() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .expect(1)
        .create_async()
        .await;

    let provider: Arc<dyn CompletionProvider> =
        Arc::new(OpenAiProvider::new("test-key".to_string(), server.url(), None).unwrap());
    let telemetry = TelemetryCollector::new();
    let pipeline = pipeline(provider, 2).with_telemetry(telemetry.clone());

    let result = pipeline.answer("budget").await;
    assert!(matches!(result, Err(NewsdeskError::RetrievalServiceError(_))));
    assert_eq!(telemetry.get_stats().queries_failed, 1);
    mock.assert_async().await;
}
