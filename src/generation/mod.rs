//! Text generation
//!
//! The answer synthesizer only sees the narrow `CompletionProvider` trait:
//! submit a prompt with sampling parameters, get text or an error back.
//! Each call is made once; nothing here retries.

pub mod ollama;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{NewsdeskError, Result};

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Default sampling temperature for grounded answers
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// One completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub model: String,
}

/// External text-generation capability
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Submit a prompt and return the raw completion text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Supported completion backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: ProviderKind,
    pub model: String,
    /// Overrides the provider's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub temperature: f32,
    /// HTTP timeout; unset means the call may block indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: openai::DEFAULT_MODEL.to_string(),
            base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl GenerationConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(NewsdeskError::ConfigError(format!(
                "generation.temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.model.trim().is_empty() {
            return Err(NewsdeskError::ConfigError(
                "generation.model must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(NewsdeskError::ConfigError(
                "generation.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Construct the configured provider
pub fn build_provider(config: &GenerationConfig) -> Result<Arc<dyn CompletionProvider>> {
    config.validate()?;
    match config.provider {
        ProviderKind::OpenAi => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                NewsdeskError::ConfigError(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string());
            Ok(Arc::new(OpenAiProvider::new(api_key, base_url, config.timeout())?))
        }
        ProviderKind::Ollama => {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| ollama::DEFAULT_OLLAMA_URL.to_string());
            Ok(Arc::new(OllamaProvider::new(base_url, config.timeout())?))
        }
    }
}

/// Map a transport failure onto the query-scoped error
pub(crate) fn service_error(provider: &str, err: reqwest::Error) -> NewsdeskError {
    if err.is_timeout() {
        NewsdeskError::RetrievalServiceError(format!("{} request timed out: {}", provider, err))
    } else {
        NewsdeskError::RetrievalServiceError(format!("{} request failed: {}", provider, err))
    }
}

/// Turn a non-success HTTP response into an error carrying its body
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(NewsdeskError::RetrievalServiceError(format!(
        "{} returned HTTP {}: {}",
        provider, status, body
    )))
}
