//! Normcheck LLM Service Layer
//!
//! HTTP clients for the two external language-model services the pipeline
//! depends on: the embedding service (text to fixed-length vector) and the
//! chat classifier (system + user message to free-form text). Both live
//! behind the trait seams in `normcheck-domain`, so every pipeline crate can
//! be tested against the deterministic mocks in this crate instead of the
//! network.
//!
//! # Examples
//!
//! ```
//! use normcheck_llm::MockEmbedding;
//! use normcheck_domain::traits::EmbeddingProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockEmbedding::new(1536);
//! let vector = provider.embed("текст фрагмента").await.unwrap();
//! assert_eq!(vector.len(), 1536);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod openai;

use async_trait::async_trait;
use normcheck_domain::traits::{ChatProvider, EmbeddingProvider};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use openai::OpenAiClient;

/// Errors that can occur talking to the embedding or chat services
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The service rejected the request for rate-limiting reasons
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The service answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, when available
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The client could not be constructed from the given settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LlmError {
    /// Whether a retry under the same conditions could succeed.
    ///
    /// Timeouts, transport failures, rate limits and server-side (5xx)
    /// statuses are transient; malformed responses and client-side (4xx)
    /// statuses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Communication(_) | LlmError::Timeout | LlmError::RateLimited => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::InvalidResponse(_) | LlmError::InvalidConfig(_) => false,
        }
    }
}

impl normcheck_domain::traits::TransientError for LlmError {
    fn is_transient(&self) -> bool {
        self.is_retryable()
    }
}

/// Deterministic embedding provider for tests
///
/// Generates hash-based unit vectors: the same text always produces the same
/// embedding, different texts produce different embeddings. Calls can be made
/// to fail for texts containing a configured marker, which is how retry and
/// drop-and-log paths are exercised.
#[derive(Debug, Clone)]
pub struct MockEmbedding {
    dimension: usize,
    fail_marker: Option<String>,
    fail_first: Arc<AtomicUsize>,
    call_count: Arc<AtomicUsize>,
}

impl MockEmbedding {
    /// Create a provider emitting vectors of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail_marker: None,
            fail_first: Arc::new(AtomicUsize::new(0)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail every call whose input contains `marker`.
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    /// Fail the first `n` calls regardless of input.
    pub fn failing_first(self, n: usize) -> Self {
        self.fail_first.store(n, Ordering::SeqCst);
        self
    }

    /// Number of embed calls made so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn hash_component(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let value = hasher.finish();
        ((value as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    type Error = LlmError;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(LlmError::Communication("mock transport failure".to_string()));
        }

        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(LlmError::Communication("mock transport failure".to_string()));
            }
        }

        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|i| Self::hash_component(text, i as u64))
            .collect();

        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Scripted chat provider for tests
///
/// Returns a default response, or a scripted response for user messages
/// containing a configured needle. No network calls.
#[derive(Debug, Clone)]
pub struct MockChat {
    default_response: String,
    scripted: Arc<Mutex<Vec<(String, String)>>>,
    fail_all: bool,
    call_count: Arc<AtomicUsize>,
}

impl MockChat {
    /// Create a provider answering every completion with `response`.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripted: Arc::new(Mutex::new(Vec::new())),
            fail_all: false,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answer with `response` whenever the user message contains `needle`.
    pub fn respond_when(self, needle: impl Into<String>, response: impl Into<String>) -> Self {
        self.scripted
            .lock()
            .expect("mock lock poisoned")
            .push((needle.into(), response.into()));
        self
    }

    /// Fail every completion with a communication error.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Number of completions requested so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockChat {
    type Error = LlmError;

    async fn complete(&self, _system: &str, user: &str) -> Result<String, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_all {
            return Err(LlmError::Communication("mock chat failure".to_string()));
        }

        let scripted = self.scripted.lock().expect("mock lock poisoned");
        for (needle, response) in scripted.iter() {
            if user.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}
