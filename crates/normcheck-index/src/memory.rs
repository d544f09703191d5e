//! In-memory cosine index
//!
//! Backs tests and local runs with the same query/upsert contract as the
//! remote index. Records live in a mutex-guarded map keyed by id, so upserts
//! are idempotent by construction.

use crate::IndexError;
use async_trait::async_trait;
use normcheck_domain::record::{QueryMatch, VectorRecord};
use normcheck_domain::traits::SemanticIndex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Cosine similarity between two equal-length vectors.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// In-memory semantic index with cosine similarity
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    dimension: Option<usize>,
    records: Arc<Mutex<HashMap<String, VectorRecord>>>,
}

impl MemoryIndex {
    /// Create an index accepting vectors of any single dimension (inferred
    /// from the first upsert).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index that enforces `dimension` on every vector.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of records currently stored
    pub fn len(&self) -> usize {
        self.records.lock().expect("index lock poisoned").len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored record by id (test observability).
    pub fn get(&self, id: &str) -> Option<VectorRecord> {
        self.records
            .lock()
            .expect("index lock poisoned")
            .get(id)
            .cloned()
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), IndexError> {
        if let Some(expected) = self.dimension {
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SemanticIndex for MemoryIndex {
    type Error = IndexError;

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, Self::Error> {
        self.check_dimension(vector)?;

        let records = self.records.lock().expect("index lock poisoned");
        let mut scored: Vec<QueryMatch> = records
            .values()
            .map(|record| QueryMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), Self::Error> {
        for record in records {
            self.check_dimension(&record.values)?;
        }

        let mut stored = self.records.lock().expect("index lock poisoned");
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normcheck_domain::record::NormMetadata;

    fn record(id: &str, values: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values,
            metadata: NormMetadata {
                kind: "Доктрина".to_string(),
                number: id.to_string(),
                short_title: format!("норма {id}"),
                url: String::new(),
                summary: String::new(),
                chunk_index: 0,
            },
        }
    }

    #[tokio::test]
    async fn query_returns_nearest_first() {
        let index = MemoryIndex::new();
        index
            .upsert(&[
                record("x", vec![1.0, 0.0, 0.0]),
                record("y", vec![0.0, 1.0, 0.0]),
                record("xy", vec![0.7071, 0.7071, 0.0]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0, 0.0], 3).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].id, "x");
        assert!(matches[0].score > 0.99);
        assert_eq!(matches[1].id, "xy");
        assert_eq!(matches[2].id, "y");
        assert!(matches[2].score.abs() < 1e-4);
    }

    #[tokio::test]
    async fn query_truncates_to_top_k() {
        let index = MemoryIndex::new();
        index
            .upsert(&[
                record("a", vec![1.0, 0.0]),
                record("b", vec![0.9, 0.1]),
                record("c", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let matches = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[tokio::test]
    async fn empty_index_returns_no_matches() {
        let index = MemoryIndex::new();
        let matches = index.query(&[1.0, 0.0], 5).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn upsert_same_id_overwrites_without_duplicating() {
        let index = MemoryIndex::new();
        index.upsert(&[record("a", vec![1.0, 0.0])]).await.unwrap();

        let mut updated = record("a", vec![0.0, 1.0]);
        updated.metadata.short_title = "обновленная норма".to_string();
        index.upsert(&[updated]).await.unwrap();

        assert_eq!(index.len(), 1);
        let stored = index.get("a").unwrap();
        assert_eq!(stored.values, vec![0.0, 1.0]);
        assert_eq!(stored.metadata.short_title, "обновленная норма");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let index = MemoryIndex::with_dimension(3);
        let result = index.upsert(&[record("a", vec![1.0, 0.0])]).await;
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_of_opposite_vectors() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((sim + 1.0).abs() < 1e-4);
    }
}
