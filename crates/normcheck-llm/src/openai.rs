//! OpenAI-compatible HTTP client
//!
//! One client serves both external model services: `/embeddings` for the
//! semantic index pipeline and `/chat/completions` for fragment
//! classification. Requests carry a builder-level timeout; a timed-out call
//! surfaces as [`LlmError::Timeout`], which callers treat as retryable.
//! Retries themselves live at the call sites behind the shared retry policy,
//! not in this client.

use crate::LlmError;
use async_trait::async_trait;
use normcheck_domain::traits::{ChatProvider, EmbeddingProvider};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default public API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model; emits 1536-dimensional vectors
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Output dimension of the default embedding model
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

/// Default chat model used for fragment classification
pub const DEFAULT_CHAT_MODEL: &str = "gpt-5.1";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sampling temperature for classification calls; low on purpose, the
/// output contract is strict JSON
const CHAT_TEMPERATURE: f64 = 0.1;

/// HTTP client for OpenAI-compatible embedding and chat endpoints
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    embedding_model: String,
    embedding_dimension: usize,
    chat_model: String,
}

impl OpenAiClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidConfig`] when the key is empty or not a
    /// valid header value, or when the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: &str) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig("empty API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| LlmError::InvalidConfig(format!("invalid API key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    /// Create a client against the public API endpoint.
    pub fn with_default_endpoint(api_key: &str) -> Result<Self, LlmError> {
        Self::new(DEFAULT_BASE_URL, api_key)
    }

    /// Override the embedding model and its output dimension.
    pub fn with_embedding_model(mut self, model: impl Into<String>, dimension: usize) -> Self {
        self.embedding_model = model.into();
        self.embedding_dimension = dimension;
        self
    }

    /// Override the chat model.
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    fn classify_status(status: StatusCode, body: String) -> LlmError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            LlmError::RateLimited
        } else {
            LlmError::Api {
                status: status.as_u16(),
                message: body,
            }
        }
    }

    fn classify_transport(err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Communication(err.to_string())
        }
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, LlmError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Self::classify_status(status, body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to decode response: {e}")))
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    type Error = LlmError;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };

        let response: EmbeddingResponse = self.post_json("/embeddings", &request).await?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| LlmError::InvalidResponse("empty embedding data".to_string()))?;

        if vector.len() != self.embedding_dimension {
            return Err(LlmError::InvalidResponse(format!(
                "expected {}-dimensional vector, got {}",
                self.embedding_dimension,
                vector.len()
            )));
        }

        debug!("embedded {} chars", text.chars().count());
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.embedding_dimension
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    type Error = LlmError;

    async fn complete(&self, system: &str, user: &str) -> Result<String, Self::Error> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: CHAT_TEMPERATURE,
        };

        let response: ChatResponse = self.post_json("/chat/completions", &request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        debug!("completion returned {} chars", content.chars().count());
        Ok(content)
    }
}
