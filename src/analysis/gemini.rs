use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{config::GeminiConfig, errors::TransportError};

/// A single-shot text completion endpoint.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, TransportError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate. Empty when the provider returned none,
    /// e.g. a safety block.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(self.url())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, model = %self.model, "gemini request rejected");
            return Err(TransportError::Status {
                service: "gemini",
                status: status.as_u16(),
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| TransportError::Payload {
            service: "gemini",
            detail: e.to_string(),
        })?;
        let text = body.into_text();
        debug!(model = %self.model, chars = text.len(), "gemini response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"name\":" }, { "text": "\"Egg\"}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(body.into_text(), "{\"name\":\"Egg\"}");
    }

    #[test]
    fn blocked_response_has_no_text() {
        let body: GenerateResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } }))
                .unwrap();
        assert_eq!(body.into_text(), "");
    }

    #[test]
    fn url_includes_model() {
        let client = GeminiClient::new(&GeminiConfig {
            api_key: "k".into(),
            model: "gemini-1.5-pro".into(),
            endpoint: "https://example.test/v1beta/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
