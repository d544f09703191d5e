//! Trait definitions for external services
//!
//! These traits define the boundaries between the pipeline and the external
//! services it drives: the embedding service, the semantic index, and the
//! chat-style classifier. Infrastructure implementations live in
//! `normcheck-llm` and `normcheck-index`; tests substitute deterministic
//! fakes. Clients are constructed once at startup and passed by reference
//! into every component that needs them.

use crate::record::{QueryMatch, VectorRecord};
use async_trait::async_trait;

/// Classification of service errors into transient and terminal
///
/// The shared retry policy consults this to decide whether another attempt
/// could succeed: timeouts and transport failures are transient, malformed
/// responses and configuration problems are not.
pub trait TransientError {
    /// Whether a retry under the same conditions could succeed
    fn is_transient(&self) -> bool;
}

/// Text-to-vector conversion via an embedding service
///
/// Implemented by the infrastructure layer (normcheck-llm)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Error type for embedding operations
    type Error: std::fmt::Display + TransientError + Send;

    /// Compute a fixed-length embedding vector for `text`.
    ///
    /// Failures are errors, never partial vectors.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Dimension of the vectors this provider produces
    fn dimension(&self) -> usize;
}

/// Similarity query and idempotent batch upsert against a vector store
///
/// Implemented by the infrastructure layer (normcheck-index)
#[async_trait]
pub trait SemanticIndex: Send + Sync {
    /// Error type for index operations
    type Error: std::fmt::Display + TransientError + Send;

    /// Return the `top_k` nearest stored records to `vector`, with metadata.
    async fn query(&self, vector: &[f32], top_k: usize)
        -> Result<Vec<QueryMatch>, Self::Error>;

    /// Insert or overwrite `records` keyed by their ids.
    ///
    /// Upserting the same id twice must leave a single record with the last
    /// written vector and metadata.
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), Self::Error>;
}

/// Chat-style completion against an external language model
///
/// Implemented by the infrastructure layer (normcheck-llm). The response is
/// free-form text; callers own prompt construction and output parsing.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Error type for completion operations
    type Error: std::fmt::Display + TransientError + Send;

    /// Run one completion with a system instruction and a user message.
    async fn complete(&self, system: &str, user: &str) -> Result<String, Self::Error>;
}
