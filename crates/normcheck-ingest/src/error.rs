//! Error types for the ingestion pipeline

use thiserror::Error;

/// Errors that can abort an ingestion run
///
/// Per-chunk and per-batch failures never appear here; they are dropped and
/// logged inside the pipeline. What remains is filesystem access to the
/// source directory and runtime plumbing.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The source directory could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A worker task could not be joined
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),
}
