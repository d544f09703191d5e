//! Error types for text extraction

use thiserror::Error;

/// Errors that can occur while extracting text from a source document
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Filesystem error reading the source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The PDF could not be parsed at the document level
    #[error("PDF parse error: {0}")]
    Pdf(String),

    /// The DOCX archive or its document part could not be read
    #[error("DOCX parse error: {0}")]
    Docx(String),
}
