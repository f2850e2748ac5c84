//! Ollama backend implementation.
//!
//! Ollama is a local LLM server; generation uses the non-streaming
//! `/api/generate` endpoint.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ollama backend for local LLM inference.
pub struct OllamaBackend {
    pub model: String,
    host: String,
    client: Client,
}

impl OllamaBackend {
    /// Create a new Ollama backend.
    pub fn new(model: String, host: String) -> Result<Self> {
        Ok(Self {
            model,
            host: host.trim_end_matches('/').to_string(),
            client: super::http_client()?,
        })
    }

    /// Generate a completion from a prompt and system instruction.
    pub async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            system: system_prompt,
            stream: false,
        };

        debug!(url = %url, model = %self.model, "Sending Ollama generate request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Ollama request failed with status {}: {}",
                status,
                body
            ));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        Ok(ollama_response.response)
    }

    /// Check if the backend is available/reachable.
    pub async fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.host);
        let response = self
            .client
            .get(&url)
            .timeout(std::time::Duration::from_secs(5))
            .send()
            .await
            .context("Failed to connect to Ollama - is it running?")?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!("Ollama health check failed: {}", response.status()))
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}
