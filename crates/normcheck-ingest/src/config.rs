//! Configuration for the ingestion pipeline

use normcheck_retry::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Fixed chunk width in characters. Uniform on purpose: ingestion favors
    /// predictable embedding cost over semantic boundaries.
    pub chunk_chars: usize,

    /// Characters of document text stored as the metadata summary
    pub summary_chars: usize,

    /// Concurrent embedding workers
    pub workers: usize,

    /// Records per upsert batch
    pub batch_size: usize,

    /// Retry policy for embedding calls and batch upserts
    pub retry: RetryPolicy,
}

impl IngestConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_chars == 0 {
            return Err("chunk_chars must be greater than 0".to_string());
        }
        if self.workers == 0 {
            return Err("workers must be greater than 0".to_string());
        }
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 1800,
            summary_chars: 700,
            workers: 4,
            batch_size: 100,
            retry: RetryPolicy::default(),
        }
    }
}
