//! Normcheck Semantic Index Layer
//!
//! Implementations of the [`SemanticIndex`] contract from `normcheck-domain`:
//! similarity query (top-k with metadata) and idempotent batch upsert keyed
//! by stable record ids.
//!
//! Two implementations ship here:
//!
//! - [`PineconeIndex`]: REST client for a serverless vector index
//! - [`MemoryIndex`]: in-memory cosine index for tests and local runs
//!
//! Index creation (dimension, cosine metric) is a startup concern outside
//! this crate; both implementations assume the index exists.
//!
//! [`SemanticIndex`]: normcheck_domain::traits::SemanticIndex

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod pinecone;

use thiserror::Error;

pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;

/// Errors that can occur against the semantic index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The index answered with a non-success status
    #[error("Index error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, when available
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A vector's dimension does not match the index
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was created with
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },

    /// The client could not be constructed from the given settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl IndexError {
    /// Whether a retry under the same conditions could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            IndexError::Communication(_) | IndexError::Timeout => true,
            IndexError::Api { status, .. } => *status == 429 || *status >= 500,
            IndexError::InvalidResponse(_)
            | IndexError::DimensionMismatch { .. }
            | IndexError::InvalidConfig(_) => false,
        }
    }
}

impl normcheck_domain::traits::TransientError for IndexError {
    fn is_transient(&self) -> bool {
        self.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(IndexError::Timeout.is_retryable());
        assert!(IndexError::Communication("reset".to_string()).is_retryable());
        assert!(IndexError::Api {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(IndexError::Api {
            status: 500,
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn structural_errors_are_terminal() {
        assert!(!IndexError::DimensionMismatch {
            expected: 1536,
            actual: 8
        }
        .is_retryable());
        assert!(!IndexError::Api {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!IndexError::InvalidResponse("bad".to_string()).is_retryable());
    }
}
