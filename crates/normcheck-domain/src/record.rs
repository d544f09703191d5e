//! Ingestion chunks and semantic index records

use crate::norm::NormItem;
use serde::{Deserialize, Serialize};

/// Metadata stored alongside every vector in the semantic index
///
/// This is the wire shape both sides of the index contract agree on: ingestion
/// writes it on upsert, retrieval maps it back into a [`NormItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormMetadata {
    /// Reference category tag ("ПП ВС РФ", "КС РФ", "Обзор ВС РФ", "Доктрина")
    #[serde(rename = "type")]
    pub kind: String,

    /// Ruling / decision / article identifier
    pub number: String,

    /// Short human-readable description (derived from the file name)
    pub short_title: String,

    /// Link to the source, empty when unknown
    #[serde(default)]
    pub url: String,

    /// Bounded prefix of the source document text
    #[serde(default)]
    pub summary: String,

    /// Zero-based chunk position within the source document
    #[serde(default)]
    pub chunk_index: usize,
}

impl NormMetadata {
    /// Map stored metadata back into a citable norm.
    pub fn to_norm(&self) -> NormItem {
        NormItem {
            kind: self.kind.clone(),
            number: self.number.clone(),
            short_title: self.short_title.clone(),
            url: if self.url.is_empty() {
                None
            } else {
                Some(self.url.clone())
            },
            summary: self.summary.clone(),
        }
    }
}

/// A unit of ingestible text: one fixed-width slice of a reference document
///
/// Created during the ingestion read phase and consumed exactly once by the
/// embedding phase.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkItem {
    /// Source file stem (file name without extension)
    pub source_stem: String,

    /// Zero-based position of this chunk within the source
    pub chunk_index: usize,

    /// Raw chunk text
    pub text: String,

    /// Base metadata derived from the source file name
    pub metadata: NormMetadata,
}

/// An id + embedding + metadata triple upserted into the semantic index
///
/// `id` is derived deterministically from (source stem, chunk index), so
/// re-running ingestion on unchanged inputs produces identical ids and the
/// upsert is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Stable ASCII record identifier
    pub id: String,

    /// Embedding vector
    pub values: Vec<f32>,

    /// Stored metadata
    pub metadata: NormMetadata,
}

/// One nearest-neighbor match returned by a semantic index query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    /// Record identifier
    pub id: String,

    /// Similarity score (cosine; higher is closer)
    pub score: f32,

    /// Stored metadata for the matched record
    pub metadata: NormMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> NormMetadata {
        NormMetadata {
            kind: "ПП ВС РФ".to_string(),
            number: "45".to_string(),
            short_title: "О применении главы 25.3 НК РФ".to_string(),
            url: String::new(),
            summary: "Разъяснения о порядке уплаты пошлины.".to_string(),
            chunk_index: 3,
        }
    }

    #[test]
    fn empty_url_maps_to_none() {
        let norm = metadata().to_norm();
        assert_eq!(norm.url, None);
        assert_eq!(norm.kind, "ПП ВС РФ");
    }

    #[test]
    fn non_empty_url_is_preserved() {
        let mut md = metadata();
        md.url = "https://vsrf.ru/45".to_string();
        assert_eq!(md.to_norm().url.as_deref(), Some("https://vsrf.ru/45"));
    }

    #[test]
    fn metadata_serializes_kind_as_type() {
        let json = serde_json::to_value(metadata()).unwrap();
        assert_eq!(json["type"], "ПП ВС РФ");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn metadata_tolerates_missing_optional_fields() {
        let md: NormMetadata =
            serde_json::from_str(r#"{"type":"КС РФ","number":"1","short_title":"t"}"#).unwrap();
        assert_eq!(md.url, "");
        assert_eq!(md.chunk_index, 0);
    }
}
