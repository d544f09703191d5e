//! Semantic retrieval of candidate norms for a fragment

use normcheck_domain::traits::{EmbeddingProvider, SemanticIndex, TransientError};
use normcheck_domain::NormItem;
use normcheck_retry::{retry, RetryPolicy};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during norm retrieval
///
/// The orchestrator degrades these to an empty candidate list; they exist so
/// call sites can log what actually failed.
#[derive(Error, Debug)]
pub enum RetrieveError {
    /// The embedding service failed after retries
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The semantic index failed after retries
    #[error("Index query failed: {0}")]
    Index(String),
}

/// Fetches the k most relevant reference norms for a fragment
///
/// Composes the embedding provider and the semantic index; both calls run
/// under the shared retry policy. An index with no matches yields an empty
/// list, which is a legitimate result, not an error.
pub struct NormRetriever<E, I> {
    embedder: Arc<E>,
    index: Arc<I>,
    policy: RetryPolicy,
}

impl<E, I> NormRetriever<E, I>
where
    E: EmbeddingProvider,
    I: SemanticIndex,
{
    /// Create a retriever over the given clients.
    pub fn new(embedder: Arc<E>, index: Arc<I>, policy: RetryPolicy) -> Self {
        Self {
            embedder,
            index,
            policy,
        }
    }

    /// Retrieve the `k` nearest norms for `fragment_text`.
    pub async fn retrieve(
        &self,
        fragment_text: &str,
        k: usize,
    ) -> Result<Vec<NormItem>, RetrieveError> {
        let vector = retry(
            &self.policy,
            "embedding",
            |e: &E::Error| e.is_transient(),
            || self.embedder.embed(fragment_text),
        )
        .await
        .map_err(|e| RetrieveError::Embedding(e.to_string()))?;

        let matches = retry(
            &self.policy,
            "index query",
            |e: &I::Error| e.is_transient(),
            || self.index.query(&vector, k),
        )
        .await
        .map_err(|e| RetrieveError::Index(e.to_string()))?;

        debug!(
            "retrieved {} candidate norms for a {}-char fragment",
            matches.len(),
            fragment_text.chars().count()
        );

        Ok(matches.into_iter().map(|m| m.metadata.to_norm()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_domain::record::{NormMetadata, VectorRecord};
    use normcheck_index::MemoryIndex;
    use normcheck_llm::MockEmbedding;
    use normcheck_retry::Backoff;
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), Backoff::Linear)
    }

    async fn seeded_index(embedder: &MockEmbedding, texts: &[&str]) -> MemoryIndex {
        let index = MemoryIndex::new();
        let mut records = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            records.push(VectorRecord {
                id: format!("rec_{i}"),
                values: embedder.embed(text).await.unwrap(),
                metadata: NormMetadata {
                    kind: "ПП ВС РФ".to_string(),
                    number: format!("{i}"),
                    short_title: text.to_string(),
                    url: String::new(),
                    summary: text.to_string(),
                    chunk_index: 0,
                },
            });
        }
        index.upsert(&records).await.unwrap();
        index
    }

    #[tokio::test]
    async fn retrieves_k_norms_with_metadata() {
        let embedder = Arc::new(MockEmbedding::new(32));
        let index = Arc::new(
            seeded_index(&embedder, &["о пошлине", "о льготах", "об аренде"]).await,
        );
        let retriever = NormRetriever::new(embedder, index, fast_policy());

        let norms = retriever.retrieve("о пошлине", 2).await.unwrap();
        assert_eq!(norms.len(), 2);
        assert_eq!(norms[0].short_title, "о пошлине");
        assert_eq!(norms[0].kind, "ПП ВС РФ");
    }

    #[tokio::test]
    async fn empty_index_yields_empty_list_not_error() {
        let embedder = Arc::new(MockEmbedding::new(32));
        let index = Arc::new(MemoryIndex::new());
        let retriever = NormRetriever::new(embedder, index, fast_policy());

        let norms = retriever.retrieve("фрагмент", 5).await.unwrap();
        assert!(norms.is_empty());
    }

    #[tokio::test]
    async fn transient_embedding_failures_are_retried() {
        let embedder = Arc::new(MockEmbedding::new(32).failing_first(2));
        let index = Arc::new(MemoryIndex::new());
        let retriever = NormRetriever::new(Arc::clone(&embedder), index, fast_policy());

        let norms = retriever.retrieve("фрагмент", 5).await;
        assert!(norms.is_ok());
        assert_eq!(embedder.call_count(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_an_embedding_error() {
        let embedder = Arc::new(MockEmbedding::new(32).failing_on("фрагмент"));
        let index = Arc::new(MemoryIndex::new());
        let retriever = NormRetriever::new(Arc::clone(&embedder), index, fast_policy());

        let result = retriever.retrieve("фрагмент", 5).await;
        assert!(matches!(result, Err(RetrieveError::Embedding(_))));
        assert_eq!(embedder.call_count(), 3);
    }
}
