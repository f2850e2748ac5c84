//! Google Gemini backend implementation.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini backend for the `generateContent` API.
pub struct GeminiBackend {
    pub model: String,
    api_key: Option<String>,
    client: Client,
}

impl GeminiBackend {
    /// Create a new Gemini backend.
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
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                anyhow!(
                    "Gemini API key not found. Set GEMINI_API_KEY environment variable \
                     or add api_key to config file."
                )
            })
    }

    /// Generate a completion from a prompt and system instruction.
    pub async fn generate(&self, system_prompt: &str, prompt: &str) -> Result<String> {
        let api_key = self.get_api_key()?;
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);

        let request = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system_prompt }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to connect to Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Result<GeminiError, _> = response.json().await;
            let message = body
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Gemini API request failed with status {}: {}",
                status,
                message
            ));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        candidate_text(gemini_response)
    }

    /// Check if the backend is usable. Only the API key is verified.
    pub async fn health_check(&self) -> Result<()> {
        self.get_api_key()?;
        Ok(())
    }
}

/// Concatenate the text parts of the first candidate.
fn candidate_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Empty response from Gemini"))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        return Err(anyhow!("Gemini candidate contained no text"));
    }
    Ok(text)
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiCandidateContent,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: "sys" }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: "hi" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "sys");
        assert!(json["system_instruction"].get("role").is_none());
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let body = r##"{"candidates":[{"content":{"parts":[{"text":"# Doc"},{"text":"\nbody"}],"role":"model"}}]}"##;
        let parsed: GeminiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(candidate_text(parsed).unwrap(), "# Doc\nbody");
    }

    #[test]
    fn test_no_candidates_is_error() {
        let parsed: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(candidate_text(parsed).is_err());
    }
}
