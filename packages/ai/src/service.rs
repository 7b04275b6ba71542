// ABOUTME: AI service for chat-completion calls to the Mistral API
// ABOUTME: Handles API requests, response extraction, and error mapping

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const DEFAULT_MODEL: &str = "mistral-small-latest";
const DEFAULT_MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum AIServiceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("No API key configured")]
    NoApiKey,

    #[error("Empty response from backend")]
    EmptyResponse,
}

pub type AIServiceResult<T> = Result<T, AIServiceError>;

/// A single best-effort completion exchange. No retries, no streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    /// Ask the backend to emit a JSON object rather than prose
    pub json_mode: bool,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            json_mode: false,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Backend-agnostic completion seam; the wizard depends on this trait so
/// tests can substitute canned responses.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether a backend credential is present; callers short-circuit to
    /// "not configured" without attempting a call when false.
    fn is_configured(&self) -> bool;

    async fn complete(&self, request: CompletionRequest) -> AIServiceResult<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    /// Either a plain string or an array of text chunks, depending on backend
    content: serde_json::Value,
}

/// AI service for chat-completion calls
pub struct AIService {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
}

impl AIService {
    /// Create HTTP client with timeout configuration
    fn create_client() -> Client {
        Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client")
    }

    /// Creates a new AI service instance.
    /// API key is fetched from MISTRAL_API_KEY environment variable.
    /// Model can be overridden with SITEQUOTE_MODEL environment variable.
    pub fn new() -> Self {
        let api_key = env::var("MISTRAL_API_KEY").ok();
        if api_key.is_none() {
            info!("MISTRAL_API_KEY not set - AI-backed operations will report not configured");
        }

        let model = env::var("SITEQUOTE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        if model != DEFAULT_MODEL {
            info!("Using custom completion model: {}", model);
        }

        Self {
            client: Self::create_client(),
            api_key,
            model,
            api_url: MISTRAL_API_URL.to_string(),
        }
    }

    /// Creates a new AI service instance with a specific API key
    pub fn with_api_key(api_key: String) -> Self {
        let model = env::var("SITEQUOTE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self {
            client: Self::create_client(),
            api_key: Some(api_key),
            model,
            api_url: MISTRAL_API_URL.to_string(),
        }
    }

    /// Override the API endpoint (tests, proxies)
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Flatten the message content, which some backends return as a plain
    /// string and others as an array of `{type, text}` chunks.
    fn extract_content(content: &serde_json::Value) -> String {
        match content {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(chunks) => chunks
                .iter()
                .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join(""),
            _ => String::new(),
        }
    }
}

impl Default for AIService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for AIService {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> AIServiceResult<String> {
        let api_key = self.api_key.as_ref().ok_or(AIServiceError::NoApiKey)?;

        let mut messages = Vec::new();
        if let Some(system) = request.system {
            messages.push(Message {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: request.prompt,
        });

        let body = ChatRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            messages,
            response_format: request.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        info!(
            "Making completion request: model={}, max_tokens={}, json_mode={}",
            body.model, body.max_tokens, request.json_mode
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("authorization", format!("Bearer {}", api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Completion request timed out");
                    AIServiceError::ApiError("Request timed out. The AI service may be overloaded or unavailable.".to_string())
                } else if e.is_connect() {
                    error!("Failed to connect to completion backend: {}", e);
                    AIServiceError::ApiError(format!("Connection failed: {}", e))
                } else {
                    error!("Completion request failed: {}", e);
                    AIServiceError::RequestFailed(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Completion API error: {} - {}", status, error_text);
            return Err(AIServiceError::ApiError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        let content = chat_response
            .choices
            .first()
            .map(|c| Self::extract_content(&c.message.content))
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(AIServiceError::EmptyResponse);
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_content_from_string_and_chunks() {
        assert_eq!(
            AIService::extract_content(&json!("plain text")),
            "plain text"
        );
        assert_eq!(
            AIService::extract_content(&json!([
                {"type": "text", "text": "part one "},
                {"type": "text", "text": "part two"}
            ])),
            "part one part two"
        );
        assert_eq!(AIService::extract_content(&json!(42)), "");
    }

    #[test]
    fn test_unconfigured_service_reports_it() {
        let service = AIService {
            client: AIService::create_client(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: MISTRAL_API_URL.to_string(),
        };
        assert!(!service.is_configured());
    }

    #[tokio::test]
    async fn test_complete_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(
                json!({"response_format": {"type": "json_object"}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "{\"ok\":true}"}}]
            })))
            .mount(&server)
            .await;

        let service = AIService::with_api_key("test-key".to_string()).with_api_url(server.uri());
        let result = service
            .complete(CompletionRequest::new("hello").json())
            .await
            .expect("mocked call should succeed");
        assert_eq!(result, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_complete_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
            .mount(&server)
            .await;

        let service = AIService::with_api_key("test-key".to_string()).with_api_url(server.uri());
        let err = service
            .complete(CompletionRequest::new("hello"))
            .await
            .expect_err("429 must map to an error");
        assert!(matches!(err, AIServiceError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_complete_rejects_blank_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "   "}}]
            })))
            .mount(&server)
            .await;

        let service = AIService::with_api_key("test-key".to_string()).with_api_url(server.uri());
        let err = service
            .complete(CompletionRequest::new("hello"))
            .await
            .expect_err("blank body must map to EmptyResponse");
        assert!(matches!(err, AIServiceError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_unconfigured_complete_short_circuits() {
        let service = AIService {
            client: AIService::create_client(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: "http://127.0.0.1:1".to_string(),
        };
        let err = service
            .complete(CompletionRequest::new("hello"))
            .await
            .expect_err("missing key must not attempt a call");
        assert!(matches!(err, AIServiceError::NoApiKey));
    }
}
