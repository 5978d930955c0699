use crate::models::{ChatMessage, ChatRequest, ChatResponse, ErrorResponse, Role};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default OpenAI-compatible API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default completion length cap
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Errors that can occur when talking to the completion API
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Completion API key is not configured")]
    NotConfigured,

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Rate limited by the completion API")]
    RateLimited,

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Anything that can turn a message sequence into an assistant reply
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatMessage, LlmError>;
}

/// Connection settings for `CompletionClient`
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Chat completions client for OpenAI-compatible APIs
///
/// Sends `POST {base_url}/chat/completions` with a bearer key and reduces
/// the reply to a single assistant message. Any OpenAI-compatible server
/// works through `base_url`.
pub struct CompletionClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(settings: CompletionSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.filter(|key| !key.trim().is_empty()),
            base_url: settings.base_url,
            model: settings.model,
            max_tokens: settings.max_tokens,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Request one completion for the full message sequence
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatMessage, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        tracing::debug!("Requesting completion from {} ({} messages)", url, messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                max_tokens: self.max_tokens,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Missing choices[0].message.content".into()))?;

        Ok(ChatMessage::assistant(content))
    }
}

#[async_trait]
impl ChatTransport for CompletionClient {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatMessage, LlmError> {
        self.complete(messages).await
    }
}

fn classify_failure(status: StatusCode, body: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        _ => {
            let message = serde_json::from_str::<ApiErrorBody>(body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| body.to_string());
            LlmError::ApiError {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Client side of the `/api/chat` proxy
pub struct ProxyTransport {
    client: Client,
    endpoint: String,
}

impl ProxyTransport {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ChatTransport for ProxyTransport {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatMessage, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                messages: messages.to_vec(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.details)
                .unwrap_or_else(|_| format!("API request failed with status {}", status));
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        if body.message.role != Role::Assistant || body.message.content.is_empty() {
            return Err(LlmError::InvalidResponse("Expected a non-empty assistant message".into()));
        }

        Ok(body.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server, api_key: Option<&str>) -> CompletionClient {
        CompletionClient::new(CompletionSettings {
            api_key: api_key.map(str::to_string),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_extracts_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"Try the food bank."}}]}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let reply = client.complete(&[ChatMessage::user("hungry")]).await.unwrap();

        assert_eq!(reply, ChatMessage::assistant("Try the food bank."));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_api() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let client = client_for(&server, Some("  "));
        assert!(!client.is_configured());
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();

        assert!(matches!(err, LlmError::NotConfigured));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_classification() {
        let mut server = mockito::Server::new_async().await;
        let _unauthorized = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server, Some("bad"));
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::Unauthorized));

        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            LlmError::RateLimited
        ));
        match classify_failure(StatusCode::BAD_GATEWAY, r#"{"error":{"message":"upstream down"}}"#) {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("key"));
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_proxy_transport_reads_message_shape() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":{"role":"assistant","content":"Hello"}}"#)
            .create_async()
            .await;

        let transport = ProxyTransport::new(format!("{}/api/chat", server.url()), 5).unwrap();
        let reply = transport.send(&[ChatMessage::user("hi")]).await.unwrap();
        assert_eq!(reply.content, "Hello");
    }

    #[tokio::test]
    async fn test_proxy_transport_surfaces_error_details() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Failed to fetch from completion API","details":"quota"}"#)
            .create_async()
            .await;

        let transport = ProxyTransport::new(format!("{}/api/chat", server.url()), 5).unwrap();
        match transport.send(&[ChatMessage::user("hi")]).await.unwrap_err() {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "quota");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
