//! LLM backend implementations.
//!
//! This module provides a unified interface for the local Ollama endpoint and
//! the hosted providers (OpenAI, Gemini). Pipelines only see [`TextGenerator`].

pub mod gemini;
#[cfg(test)]
pub mod mock;
pub mod ollama;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::BackendConfig;

/// Generation requests block until the whole completion arrives.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// A single blocking prompt -> completion call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send a system instruction and a user prompt, returning the raw completion.
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String>;

    /// Backend name for log lines.
    fn name(&self) -> &str;

    /// Model identifier for log lines.
    fn model(&self) -> &str;
}

/// Enum-based backend for LLM providers.
pub enum Backend {
    Ollama(ollama::OllamaBackend),
    OpenAI(openai::OpenAIBackend),
    Gemini(gemini::GeminiBackend),
}

impl Backend {
    /// Check if the backend is available/reachable.
    pub async fn health_check(&self) -> Result<()> {
        match self {
            Backend::Ollama(b) => b.health_check().await,
            Backend::OpenAI(b) => b.health_check().await,
            Backend::Gemini(b) => b.health_check().await,
        }
    }
}

#[async_trait]
impl TextGenerator for Backend {
    async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        match self {
            Backend::Ollama(b) => b.generate(system_prompt, prompt).await,
            Backend::OpenAI(b) => b.generate(system_prompt, prompt).await,
            Backend::Gemini(b) => b.generate(system_prompt, prompt).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            Backend::Ollama(_) => "ollama",
            Backend::OpenAI(_) => "openai",
            Backend::Gemini(_) => "gemini",
        }
    }

    fn model(&self) -> &str {
        match self {
            Backend::Ollama(b) => &b.model,
            Backend::OpenAI(b) => &b.model,
            Backend::Gemini(b) => &b.model,
        }
    }
}

/// Create a backend from configuration, optionally replacing the model id.
pub fn create_backend(config: &BackendConfig, model_override: Option<&str>) -> Result<Backend> {
    let pick = |model: &String| model_override.map_or_else(|| model.clone(), str::to_string);
    let backend = match config {
        BackendConfig::Ollama { model, host } => {
            Backend::Ollama(ollama::OllamaBackend::new(pick(model), host.clone())?)
        }
        BackendConfig::OpenAI { model, api_key } => {
            Backend::OpenAI(openai::OpenAIBackend::new(pick(model), api_key.clone())?)
        }
        BackendConfig::Gemini { model, api_key } => {
            Backend::Gemini(gemini::GeminiBackend::new(pick(model), api_key.clone())?)
        }
    };
    Ok(backend)
}

/// Build the shared HTTP client used by every backend.
pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))
}
