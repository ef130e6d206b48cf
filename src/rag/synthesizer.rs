// Answer synthesis: one completion call over the retrieved context
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{NewsdeskError, Result};
use crate::generation::{CompletionProvider, CompletionRequest, GenerationConfig};
use crate::rag::context::{build_context, render_prompt};
use crate::rag::retrieval::RetrievedDocument;

/// Builds the grounded prompt and asks the completion provider once
pub struct AnswerSynthesizer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    temperature: f32,
}

impl AnswerSynthesizer {
    /// Create from generation settings; invalid settings are rejected here
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &GenerationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Prompt that would be sent for `query` over `context`
    pub fn prompt(&self, query: &str, context: &[RetrievedDocument]) -> String {
        render_prompt(query, &build_context(context))
    }

    /// Answer `query` from `context`; returns the trimmed completion
    pub async fn synthesize(&self, query: &str, context: &[RetrievedDocument]) -> Result<String> {
        let request = CompletionRequest {
            prompt: self.prompt(query, context),
            temperature: self.temperature,
            model: self.model.clone(),
        };
        debug!(
            provider = self.provider.name(),
            documents = context.len(),
            prompt_chars = request.prompt.len(),
            "requesting completion"
        );

        let text = self.provider.complete(&request).await.map_err(|e| {
            warn!(provider = self.provider.name(), error = %e, "completion failed");
            match e {
                NewsdeskError::RetrievalServiceError(_) => e,
                other => NewsdeskError::RetrievalServiceError(other.to_string()),
            }
        })?;

        let answer = text.trim();
        if answer.is_empty() {
            return Err(NewsdeskError::RetrievalServiceError(format!(
                "{} returned an empty completion",
                self.provider.name()
            )));
        }
        Ok(answer.to_string())
    }
}
