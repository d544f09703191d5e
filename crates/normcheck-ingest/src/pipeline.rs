//! Embed and upsert phases of the ingestion pipeline

use crate::config::IngestConfig;
use crate::error::IngestError;
use crate::reader::{make_vector_id, read_documents};
use normcheck_domain::record::{ChunkItem, VectorRecord};
use normcheck_domain::traits::{EmbeddingProvider, SemanticIndex, TransientError};
use normcheck_extract::TextExtractor;
use normcheck_retry::retry;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

/// Counters for one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files that contributed at least one chunk
    pub files_indexed: usize,

    /// Chunks produced by the read phase
    pub chunks_total: usize,

    /// Chunks successfully embedded
    pub chunks_embedded: usize,

    /// Chunks dropped after exhausting embedding retries
    pub chunks_failed: usize,

    /// Batches successfully upserted
    pub batches_upserted: usize,

    /// Batches dropped after exhausting upsert retries
    pub batches_failed: usize,

    /// Records that reached the index
    pub records_upserted: usize,
}

impl IngestReport {
    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} files, {} chunks ({} embedded, {} dropped), {} records upserted in {} batches ({} batches dropped)",
            self.files_indexed,
            self.chunks_total,
            self.chunks_embedded,
            self.chunks_failed,
            self.records_upserted,
            self.batches_upserted,
            self.batches_failed
        )
    }
}

/// Outcome of embedding one chunk, sent to the collector
enum EmbedOutcome {
    Embedded(VectorRecord),
    Dropped,
}

/// The ingestion pipeline over an embedding provider and a semantic index
pub struct IngestionPipeline<E, I>
where
    E: EmbeddingProvider,
    I: SemanticIndex,
{
    embedder: Arc<E>,
    index: Arc<I>,
    extractor: TextExtractor,
    config: IngestConfig,
}

impl<E, I> IngestionPipeline<E, I>
where
    E: EmbeddingProvider + 'static,
    I: SemanticIndex + 'static,
{
    /// Create a pipeline over the given clients.
    pub fn new(embedder: Arc<E>, index: Arc<I>, config: IngestConfig) -> Self {
        Self {
            embedder,
            index,
            extractor: TextExtractor::new(),
            config,
        }
    }

    /// Use a specific extractor (e.g. one with a cache directory).
    pub fn with_extractor(mut self, extractor: TextExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run the full pipeline over the reference documents under `dir`.
    pub async fn run(&self, dir: &Path) -> Result<IngestReport, IngestError> {
        self.config.validate().map_err(IngestError::Config)?;

        let extractor = self.extractor.clone();
        let owned_dir = dir.to_path_buf();
        let chunk_chars = self.config.chunk_chars;
        let summary_chars = self.config.summary_chars;

        let (chunks, files_indexed) = tokio::task::spawn_blocking(move || {
            read_documents(&owned_dir, &extractor, chunk_chars, summary_chars)
        })
        .await
        .map_err(|e| IngestError::Runtime(format!("read task failed: {e}")))?;

        let chunks_total = chunks.len();
        info!(
            "read phase done: {} chunks from {} files",
            chunks_total, files_indexed
        );

        if chunks.is_empty() {
            return Ok(IngestReport {
                files_indexed,
                ..IngestReport::default()
            });
        }

        let (records, chunks_failed) = self.embed_chunks(chunks).await?;
        info!(
            "embed phase done: {} records, {} chunks dropped",
            records.len(),
            chunks_failed
        );

        let (batches_upserted, batches_failed, records_upserted) =
            self.upsert_records(&records).await;

        let report = IngestReport {
            files_indexed,
            chunks_total,
            chunks_embedded: records.len(),
            chunks_failed,
            batches_upserted,
            batches_failed,
            records_upserted,
        };
        info!("ingestion complete: {}", report.summary());
        Ok(report)
    }

    /// Embed phase: a fixed pool of workers consumes the chunk queue and
    /// publishes to a single collector.
    ///
    /// Workers share the queue receiver behind a mutex and never see each
    /// other's in-flight work; record ids derive from source identity, so
    /// collection order does not affect final index state.
    async fn embed_chunks(
        &self,
        chunks: Vec<ChunkItem>,
    ) -> Result<(Vec<VectorRecord>, usize), IngestError> {
        let capacity = chunks.len();
        let (work_tx, work_rx) = mpsc::channel::<ChunkItem>(capacity);
        for chunk in chunks {
            if work_tx.send(chunk).await.is_err() {
                return Err(IngestError::Runtime("work queue closed early".to_string()));
            }
        }
        drop(work_tx);

        let work_rx = Arc::new(AsyncMutex::new(work_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<EmbedOutcome>(capacity);

        let workers = self.config.workers.min(capacity).max(1);
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let work_rx = Arc::clone(&work_rx);
            let result_tx = result_tx.clone();
            let embedder = Arc::clone(&self.embedder);
            let policy = self.config.retry;

            handles.push(tokio::spawn(async move {
                loop {
                    let chunk = { work_rx.lock().await.recv().await };
                    let Some(chunk) = chunk else { break };

                    let result = retry(
                        &policy,
                        "embedding",
                        |e: &E::Error| e.is_transient(),
                        || embedder.embed(&chunk.text),
                    )
                    .await;

                    let outcome = match result {
                        Ok(values) => EmbedOutcome::Embedded(VectorRecord {
                            id: make_vector_id(&chunk.source_stem, chunk.chunk_index),
                            values,
                            metadata: chunk.metadata,
                        }),
                        Err(err) => {
                            warn!(
                                "dropping chunk {} of '{}' after retries: {}",
                                chunk.chunk_index, chunk.source_stem, err
                            );
                            EmbedOutcome::Dropped
                        }
                    };

                    if result_tx.send(outcome).await.is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let mut records = Vec::new();
        let mut failed = 0usize;
        while let Some(outcome) = result_rx.recv().await {
            match outcome {
                EmbedOutcome::Embedded(record) => records.push(record),
                EmbedOutcome::Dropped => failed += 1,
            }
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| IngestError::Runtime(format!("embed worker failed: {e}")))?;
        }

        Ok((records, failed))
    }

    /// Upsert phase: fixed-size batches under the shared retry policy.
    ///
    /// An exhausted batch is dropped and logged; deterministic ids make a
    /// later re-run fill the gap without duplicating anything.
    async fn upsert_records(&self, records: &[VectorRecord]) -> (usize, usize, usize) {
        let mut batches_upserted = 0usize;
        let mut batches_failed = 0usize;
        let mut records_upserted = 0usize;

        for batch in records.chunks(self.config.batch_size) {
            let result = retry(
                &self.config.retry,
                "index upsert",
                |e: &I::Error| e.is_transient(),
                || self.index.upsert(batch),
            )
            .await;

            match result {
                Ok(()) => {
                    batches_upserted += 1;
                    records_upserted += batch.len();
                }
                Err(err) => {
                    batches_failed += 1;
                    warn!(
                        "dropping batch of {} records after retries: {}",
                        batch.len(),
                        err
                    );
                }
            }
        }

        (batches_upserted, batches_failed, records_upserted)
    }
}
