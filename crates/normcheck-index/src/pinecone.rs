//! REST client for a Pinecone-style serverless vector index
//!
//! Speaks the data-plane contract: `POST /query` with `topK` +
//! `includeMetadata`, and `POST /vectors/upsert` with id/values/metadata
//! records. Upserts with identical ids overwrite, which is what makes
//! ingestion re-runs safe. Retries live at the call sites behind the shared
//! retry policy.

use crate::IndexError;
use async_trait::async_trait;
use normcheck_domain::record::{NormMetadata, QueryMatch, VectorRecord};
use normcheck_domain::traits::SemanticIndex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authentication header the index expects
const API_KEY_HEADER: &str = "Api-Key";

/// HTTP client for one serverless index
pub struct PineconeIndex {
    client: reqwest::Client,
    host: String,
}

impl PineconeIndex {
    /// Create a client for the index served at `host` (the per-index data
    /// plane URL) authenticating with `api_key`.
    pub fn new(host: impl Into<String>, api_key: &str) -> Result<Self, IndexError> {
        if api_key.trim().is_empty() {
            return Err(IndexError::InvalidConfig("empty API key".to_string()));
        }

        let host = host.into();
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(IndexError::InvalidConfig(
                "index host must be an http(s) URL".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(api_key.trim())
                .map_err(|e| IndexError::InvalidConfig(format!("invalid API key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .default_headers(headers)
            .build()
            .map_err(|e| IndexError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        })
    }

    fn classify_transport(err: reqwest::Error) -> IndexError {
        if err.is_timeout() {
            IndexError::Timeout
        } else {
            IndexError::Communication(err.to_string())
        }
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, IndexError> {
        let url = format!("{}{}", self.host, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(IndexError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| IndexError::InvalidResponse(format!("failed to decode response: {e}")))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<NormMetadata>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

#[async_trait]
impl SemanticIndex for PineconeIndex {
    type Error = IndexError;

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, Self::Error> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
        };

        let response: QueryResponse = self.post_json("/query", &request).await?;

        // Matches without stored metadata cannot be cited; drop them rather
        // than inventing empty norms.
        let matches = response
            .matches
            .into_iter()
            .filter_map(|m| {
                m.metadata.map(|metadata| QueryMatch {
                    id: m.id,
                    score: m.score,
                    metadata,
                })
            })
            .collect::<Vec<_>>();

        debug!("index query returned {} matches", matches.len());
        Ok(matches)
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), Self::Error> {
        if records.is_empty() {
            return Ok(());
        }

        let request = UpsertRequest { vectors: records };
        let response: UpsertResponse = self.post_json("/vectors/upsert", &request).await?;

        debug!(
            "upserted {} of {} records",
            response.upserted_count,
            records.len()
        );
        Ok(())
    }
}
