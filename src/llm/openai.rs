//! OpenAI backend implementation.
//!
//! Uses the chat completions API with a system and a user message.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI backend for GPT API.
pub struct OpenAIBackend {
    pub model: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend.
    pub fn new(model: String, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            model,
            api_key,
            client: super::http_client()?,
        })
    }

    /// Get the API key from config or environment.
    fn get_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                anyhow!(
                    "OpenAI API key not found. Set OPENAI_API_KEY environment variable \
                     or add api_key to config file."
                )
            })
    }

    /// Generate a completion from a prompt and system instruction.
    pub async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let api_key = self.get_api_key()?;

        let request = OpenAIRequest {
            model: &self.model,
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: system_prompt,
                },
                OpenAIMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Result<OpenAIError, _> = response.json().await;
            let message = body
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "OpenAI API request failed with status {}: {}",
                status,
                message
            ));
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        first_choice(openai_response)
    }

    /// Check if the backend is usable. Only the API key is verified.
    pub async fn health_check(&self) -> Result<()> {
        self.get_api_key()?;
        Ok(())
    }
}

fn first_choice(response: OpenAIResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("Empty response from OpenAI"))
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let parsed: OpenAIResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_choice(parsed).unwrap(), "hello");
    }

    #[test]
    fn test_no_choices_is_error() {
        let parsed: OpenAIResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(first_choice(parsed).is_err());
    }

    #[test]
    fn test_configured_key_wins() {
        let backend = OpenAIBackend::new("gpt".to_string(), Some("sk-test".to_string())).unwrap();
        assert_eq!(backend.get_api_key().unwrap(), "sk-test");
    }
}
