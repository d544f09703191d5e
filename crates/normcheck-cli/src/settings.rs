//! Process configuration from environment variables.
//!
//! Missing credentials are fatal at startup; the pipelines themselves never
//! see configuration errors.

use crate::error::{CliError, Result};
use std::path::PathBuf;

/// Default public endpoint for the model services
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment-backed process settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the embedding and chat services
    pub openai_api_key: String,

    /// Base URL for the embedding and chat services
    pub openai_base_url: String,

    /// Data-plane URL of the semantic index
    pub index_host: String,

    /// API key for the semantic index
    pub index_api_key: String,

    /// Extraction cache directory; caching is disabled when unset
    pub cache_dir: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an explicit lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CliError::Config(format!("{name} is not set")))
        };

        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            index_host: required("PINECONE_INDEX_HOST")?,
            index_api_key: required("PINECONE_API_KEY")?,
            cache_dir: lookup("NORMCHECK_CACHE_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn full_environment_loads() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PINECONE_INDEX_HOST", "https://idx.example.io"),
            ("PINECONE_API_KEY", "pc-test"),
            ("NORMCHECK_CACHE_DIR", "/tmp/cache"),
        ]))
        .unwrap();

        assert_eq!(settings.openai_api_key, "sk-test");
        assert_eq!(settings.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(settings.cache_dir, Some(PathBuf::from("/tmp/cache")));
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = Settings::from_lookup(lookup_from(&[
            ("PINECONE_INDEX_HOST", "https://idx.example.io"),
            ("PINECONE_API_KEY", "pc-test"),
        ]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let result = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "  "),
            ("PINECONE_INDEX_HOST", "https://idx.example.io"),
            ("PINECONE_API_KEY", "pc-test"),
        ]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn cache_dir_is_optional() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PINECONE_INDEX_HOST", "https://idx.example.io"),
            ("PINECONE_API_KEY", "pc-test"),
        ]))
        .unwrap();
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    fn base_url_can_be_overridden() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "https://proxy.internal/v1"),
            ("PINECONE_INDEX_HOST", "https://idx.example.io"),
            ("PINECONE_API_KEY", "pc-test"),
        ]))
        .unwrap();
        assert_eq!(settings.openai_base_url, "https://proxy.internal/v1");
    }
}
