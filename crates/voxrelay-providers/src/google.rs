//! Google Generative AI (Gemini) provider.
//!
//! Sends the flattened conversation to the `generateContent` endpoint as a
//! single user message. Auth is via the `x-goog-api-key` header.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use voxrelay_core::config::LlmConfig;
use voxrelay_core::error::{Result, VoxRelayError};
use voxrelay_core::session::Turn;

use crate::{format_conversation, LlmProvider};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiProvider {
    pub base_url: String,
    model: String,
    config: LlmConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            base_url: config
                .base_url
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: config.model(),
            config,
            client: reqwest::Client::new(),
        }
    }
}

// --- Gemini request/response types ---

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn id(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, conversation: &[Turn]) -> Result<String> {
        let api_key = self.config.resolve_api_key().ok_or_else(|| {
            VoxRelayError::Generation("No language model API key configured".into())
        })?;

        let prompt = format_conversation(conversation);
        let body = GeminiRequest {
            contents: vec![json!({
                "role": "user",
                "parts": [{ "text": prompt }],
            })],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        debug!(
            model = %self.model,
            turns = conversation.len(),
            prompt_chars = prompt.len(),
            "Calling Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VoxRelayError::Generation(e.without_url().to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoxRelayError::Generation(format!(
                "Gemini API error {status}: {body}"
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| VoxRelayError::Generation(format!("invalid Gemini response: {e}")))?;

        let text = parsed.text().ok_or_else(|| {
            let reason = parsed
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".into());
            VoxRelayError::Generation(format!("Gemini returned no text ({reason})"))
        })?;

        if let Some(usage) = &parsed.usage_metadata {
            info!(
                model = %self.model,
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini reply generated"
            );
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{extract::Query, http::HeaderMap, routing::post, Json, Router};
    use std::collections::HashMap;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn provider_for(base_url: String, api_key: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(LlmConfig {
            api_key: api_key.map(Into::into),
            api_key_env: None,
            base_url: Some(base_url),
            model: None,
        })
    }

    #[test]
    fn test_gemini_provider_creation() {
        let provider = GeminiProvider::new(LlmConfig::default());
        assert_eq!(provider.id(), "google");
        assert_eq!(provider.model(), "gemini-2.5-flash");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_gemini_response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"Hi "},{"text":"there!"}],"role":"model"},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":5}}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.text().as_deref(), Some("Hi there!"));
        assert_eq!(resp.usage_metadata.unwrap().prompt_token_count, 10);
    }

    #[test]
    fn test_gemini_response_without_candidates() {
        let resp: GeminiResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(resp.text().is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_flattened_prompt() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(
                |axum::extract::Path(call): axum::extract::Path<String>,
                 Query(q): Query<HashMap<String, String>>,
                 headers: HeaderMap,
                 Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(call, "gemini-2.5-flash:generateContent");
                    assert_eq!(headers["x-goog-api-key"], "test-key");
                    assert!(!q.contains_key("key"));
                    let prompt = body["contents"][0]["parts"][0]["text"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({
                        "candidates": [{
                            "content": { "parts": [{ "text": format!("echo<{prompt}>") }] },
                            "finishReason": "STOP"
                        }]
                    }))
                },
            ),
        );
        let provider = provider_for(spawn_mock(router).await, Some("test-key"));

        let reply = provider
            .generate(&[Turn::user("Hello"), Turn::assistant("Hi"), Turn::user("Bye")])
            .await
            .unwrap();
        assert_eq!(reply, "echo<User: Hello\nAssistant: Hi\nUser: Bye>");
    }

    #[tokio::test]
    async fn test_generate_non_success_is_generation_error() {
        let router = Router::new().route(
            "/v1beta/models/{call}",
            post(|| async {
                (
                    axum::http::StatusCode::TOO_MANY_REQUESTS,
                    "quota exceeded",
                )
            }),
        );
        let provider = provider_for(spawn_mock(router).await, Some("test-key"));

        let err = provider.generate(&[Turn::user("Hello")]).await.unwrap_err();
        assert_eq!(err.kind(), "generation");
        assert!(err.detail().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_generate_without_key_fails() {
        let provider = provider_for("http://127.0.0.1:9".into(), None);
        let err = provider.generate(&[Turn::user("Hello")]).await.unwrap_err();
        assert!(matches!(err, VoxRelayError::Generation(_)));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        let provider = provider_for("http://127.0.0.1:9".into(), Some("test-key"));
        let err = provider.generate(&[Turn::user("Hello")]).await.unwrap_err();
        assert_eq!(err.kind(), "generation");
        assert!(!err.detail().contains("test-key"));
        assert!(!err.to_string().contains("test-key"));
    }
}
