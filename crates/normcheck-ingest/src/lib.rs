//! Normcheck Ingestion Pipeline
//!
//! Batch job that populates the semantic index from a directory of reference
//! documents. Three phases:
//!
//! 1. **Read** (sequential): discover documents, extract text, slice it into
//!    fixed-width chunks, and derive reference-category metadata from the
//!    file name.
//! 2. **Embed** (bounded concurrency): a fixed pool of workers consumes a
//!    chunk queue, retrying each embedding call with linear backoff before
//!    dropping the chunk; results flow into a single collector.
//! 3. **Upsert** (sequential): vector records go to the index in fixed-size
//!    batches under the same retry policy; an exhausted batch is dropped and
//!    logged, never aborting the job.
//!
//! Vector ids derive deterministically from (source stem, chunk index), so
//! re-running the whole pipeline after partial failures re-upserts only what
//! is missing and never duplicates what already succeeded.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
mod error;
pub mod pipeline;
pub mod reader;

pub use config::IngestConfig;
pub use error::IngestError;
pub use pipeline::{IngestReport, IngestionPipeline};
pub use reader::{build_metadata, make_vector_id, read_documents, split_into_chunks};
