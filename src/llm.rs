//! LLM client abstraction and Gemini API implementation.
//!
//! This module provides a generic [`LlmClient`] trait for interacting with
//! language models, along with concrete implementations:
//!
//! - [`GeminiClient`]: production client for Google's Generative Language API
//! - [`MockLlmClient`]: test double for unit tests
//!
//! Used by the intent classifier to label messages the local heuristics
//! cannot resolve.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default model used for intent classification.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default bound on a single classification request.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(8);

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP or network error occurred.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("API returned status {0}")]
    Status(u16),

    /// Failed to parse the API response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Model returned no text content.
    #[error("Model returned empty response")]
    EmptyResponse,
}

// ============================================================================
// Completion Type
// ============================================================================

/// The result of a successful LLM completion request.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The generated text from the model.
    pub text: String,
}

// ============================================================================
// LlmClient Trait
// ============================================================================

/// Generic interface for LLM clients.
///
/// Supports simple system+user prompt completion with text response.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion given a system prompt and user message.
    ///
    /// # Arguments
    ///
    /// * `system` - System-level instructions for the model
    /// * `user` - User message or prompt
    ///
    /// # Returns
    ///
    /// A [`Completion`] containing the model's response text.
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, LlmError>;
}

// ============================================================================
// Gemini API Implementation
// ============================================================================

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body for `generateContent`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

/// Response from `generateContent`.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: GeminiContent,
}

impl GeminiClient {
    /// Create a new client with an explicit API key, the default model and
    /// the default timeout.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: DEFAULT_LLM_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_BASE_URL}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, LlmError> {
        let request_body = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system.to_string(),
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: user.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&request_body)
            .send()
            .await
            .map_err(map_transport_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status(status.as_u16()));
        }

        let api_response: GeminiResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Parse(e.to_string())
            }
        })?;

        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(Completion { text })
    }
}

fn map_transport_err(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Http(err.to_string())
    }
}

// ============================================================================
// Mock Implementation (Test Only)
// ============================================================================

/// Mock LLM client for testing. Returns pre-programmed results in FIFO order.
#[cfg(test)]
pub struct MockLlmClient {
    /// Pre-programmed results to return in FIFO order.
    pub responses: std::sync::Mutex<std::collections::VecDeque<Result<String, LlmError>>>,
    /// Number of `complete` calls made so far.
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockLlmClient {
    /// Create a new mock client with a sequence of successful responses.
    ///
    /// # Panics
    ///
    /// Panics if [`complete`](LlmClient::complete) is called more times
    /// than there are responses.
    pub fn new(responses: Vec<String>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock that can also fail, e.g. with [`LlmError::Timeout`].
    pub fn with_results(results: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(results.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _system: &str, _user: &str) -> Result<Completion, LlmError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let text = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockLlmClient: no more responses available")?;

        Ok(Completion { text })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_model() {
        let client = GeminiClient::new("k".into()).with_model("gemini-test");
        assert_eq!(
            client.endpoint(),
            format!("{GEMINI_BASE_URL}/gemini-test:generateContent")
        );
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: "sys".into() }],
            },
            contents: vec![],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".into(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_response_parses_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"intent\":"},{"text":"\"unknown\"}"}]}}]}"#;
        let parsed: GeminiResponse = serde_json::from_str(raw).unwrap();
        let text: String = parsed.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, r#"{"intent":"unknown"}"#);
    }

    #[tokio::test]
    async fn test_mock_returns_responses_in_order() {
        let mock = MockLlmClient::new(vec!["first".to_string(), "second".to_string()]);

        let completion1 = mock.complete("sys", "user").await.unwrap();
        assert_eq!(completion1.text, "first");

        let completion2 = mock.complete("sys", "user").await.unwrap();
        assert_eq!(completion2.text, "second");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_returns_errors() {
        let mock = MockLlmClient::with_results(vec![Err(LlmError::Timeout)]);
        let result = mock.complete("sys", "user").await;
        assert!(matches!(result, Err(LlmError::Timeout)));
    }
}
