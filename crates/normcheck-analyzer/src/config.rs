//! Configuration for the analysis pipeline

use normcheck_retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Nearest norms to retrieve per fragment
    pub top_k: usize,

    /// Topic-matched fragments analyzed per document. A cost and latency
    /// control, not a correctness bound.
    pub max_fragments: usize,

    /// Maximum time for a single classification call (seconds)
    pub classify_timeout_secs: u64,

    /// Retry policy for embedding and index calls during retrieval
    pub retry: RetryPolicy,
}

impl AnalyzerConfig {
    /// Get the classification timeout as a Duration
    pub fn classify_timeout(&self) -> Duration {
        Duration::from_secs(self.classify_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("top_k must be greater than 0".to_string());
        }
        if self.max_fragments == 0 {
            return Err("max_fragments must be greater than 0".to_string());
        }
        if self.classify_timeout_secs == 0 {
            return Err("classify_timeout_secs must be greater than 0".to_string());
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

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_fragments: 5,
            classify_timeout_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}
