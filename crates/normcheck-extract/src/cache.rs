//! Plain-text extraction cache keyed by source file stem
//!
//! For each source document the cache holds a `.txt` artifact and a
//! `.meta.json` sidecar recording the source modification time, item count
//! and character count. A cached artifact is valid while the recorded
//! modification time matches the source within 1 ms.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// Tolerance when comparing recorded and current modification times
const MTIME_EPSILON_SECS: f64 = 1e-3;

/// Sidecar metadata for one cached extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheMeta {
    /// Source modification time, seconds since the Unix epoch
    mtime: f64,
    /// Pages (PDF) or paragraphs (DOCX) in the source
    items: usize,
    /// Characters in the extracted text
    chars: usize,
}

/// Filesystem cache of extraction results
#[derive(Debug, Clone)]
pub struct ExtractionCache {
    dir: PathBuf,
}

impl ExtractionCache {
    /// Create a cache rooted at `dir`. The directory is created lazily on
    /// the first store.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn artifact_paths(&self, source: &Path) -> (PathBuf, PathBuf) {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let txt = self.dir.join(format!("{stem}.txt"));
        let meta = self.dir.join(format!("{stem}.meta.json"));
        (txt, meta)
    }

    fn source_mtime_secs(source: &Path) -> Option<f64> {
        let modified = fs::metadata(source).ok()?.modified().ok()?;
        let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
        Some(since_epoch.as_secs_f64())
    }

    /// Return the cached text for `source` if the cache entry is still valid.
    pub fn load(&self, source: &Path) -> Option<String> {
        let (txt_path, meta_path) = self.artifact_paths(source);

        let meta_raw = fs::read_to_string(&meta_path).ok()?;
        let meta: CacheMeta = serde_json::from_str(&meta_raw).ok()?;
        let current_mtime = Self::source_mtime_secs(source)?;

        if (meta.mtime - current_mtime).abs() >= MTIME_EPSILON_SECS {
            debug!(
                "cache stale for {}: recorded mtime {} vs current {}",
                source.display(),
                meta.mtime,
                current_mtime
            );
            return None;
        }

        fs::read_to_string(&txt_path).ok()
    }

    /// Persist freshly extracted text for `source`.
    ///
    /// Write failures are logged and swallowed: a broken cache must never
    /// fail an extraction that already succeeded.
    pub fn store(&self, source: &Path, text: &str, items: usize) {
        if let Err(err) = self.try_store(source, text, items) {
            warn!(
                "failed to cache extraction for {}: {}",
                source.display(),
                err
            );
        }
    }

    fn try_store(&self, source: &Path, text: &str, items: usize) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let (txt_path, meta_path) = self.artifact_paths(source);

        let mtime = Self::source_mtime_secs(source).unwrap_or(0.0);
        let meta = CacheMeta {
            mtime,
            items,
            chars: text.chars().count(),
        };

        fs::write(&txt_path, text)?;
        let meta_json = serde_json::to_string(&meta)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&meta_path, meta_json)?;
        Ok(())
    }
}
