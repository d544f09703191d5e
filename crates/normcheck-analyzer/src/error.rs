//! Error types for the analysis pipeline

use thiserror::Error;

/// Errors that can escape the analysis orchestrator
///
/// Document-content problems never surface here; they degrade into labeled
/// analysis outcomes. What remains is runtime plumbing.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A blocking extraction task could not be joined
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),
}
