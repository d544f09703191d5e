//! Error handling for the CLI.

use thiserror::Error;

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the CLI user
#[derive(Error, Debug)]
pub enum CliError {
    /// Missing or invalid process configuration; fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM client construction or call failure
    #[error(transparent)]
    Llm(#[from] normcheck_llm::LlmError),

    /// Index client construction or call failure
    #[error(transparent)]
    Index(#[from] normcheck_index::IndexError),

    /// Analysis pipeline failure
    #[error(transparent)]
    Analyzer(#[from] normcheck_analyzer::AnalyzerError),

    /// Ingestion pipeline failure
    #[error(transparent)]
    Ingest(#[from] normcheck_ingest::IngestError),
}
