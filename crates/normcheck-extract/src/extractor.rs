//! Format dispatch and cache orchestration for text extraction

use crate::cache::ExtractionCache;
use crate::docx::extract_docx;
use crate::error::ExtractError;
use crate::pdf::extract_pdf;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extracts plain text from source documents, with optional caching
///
/// Supported formats: PDF (page-based) and DOCX (structured text). Any other
/// extension yields empty text, signalling "cannot analyze" to the caller
/// without an error.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor {
    cache: Option<ExtractionCache>,
}

impl TextExtractor {
    /// Create an extractor without a cache.
    pub fn new() -> Self {
        Self { cache: None }
    }

    /// Create an extractor that caches results in `cache`.
    pub fn with_cache(cache: ExtractionCache) -> Self {
        Self { cache: Some(cache) }
    }

    /// Extract plain text from the document at `path`.
    ///
    /// Returns cached text when the source has not changed since the cached
    /// extraction. Unsupported extensions return an empty string.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        if let Some(cache) = &self.cache {
            if let Some(text) = cache.load(path) {
                debug!("cache hit for {}", path.display());
                return Ok(text);
            }
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let started = Instant::now();
        let (text, items) = match extension.as_str() {
            "pdf" => extract_pdf(path)?,
            "docx" => extract_docx(path)?,
            other => {
                warn!(
                    "unsupported format '{}' for {}, skipping",
                    other,
                    path.display()
                );
                return Ok(String::new());
            }
        };

        info!(
            "extracted {}: {} items, {} chars in {:?}",
            path.display(),
            items,
            text.chars().count(),
            started.elapsed()
        );

        if let Some(cache) = &self.cache {
            cache.store(path, &text, items);
        }

        Ok(text)
    }
}
