
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::{PageMetadata, QueryMatch, StoreRecord, VectorIndex, dedupe_by_id};
use crate::config::VectorStoreConfig;
use crate::{LinkragError, Result};

const API_VERSION: &str = "2024-07";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Pinecone accepts at most this many vectors per upsert request
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Hosted vector index reached over the Pinecone data-plane REST API
#[derive(Debug, Clone)]
pub struct PineconeClient {
    host: String,
    api_key: String,
    namespace: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a PageMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<PageMetadata>,
}

impl PineconeClient {
    #[inline]
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        let host = config
            .require_pinecone_host()
            .map_err(|e| LinkragError::Config(e.to_string()))?;
        let api_key = config
            .require_api_key()
            .map_err(|e| LinkragError::Config(e.to_string()))?;

        Ok(Self {
            host: normalize_host(host),
            api_key: api_key.trim().to_string(),
            namespace: config.namespace.clone(),
            agent: build_agent(DEFAULT_TIMEOUT),
        })
    }

    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Upsert records in batches; returns the count Pinecone reports
    #[inline]
    pub fn upsert_blocking(&self, records: &[StoreRecord]) -> Result<usize> {
        let mut upserted = 0;

        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let request = UpsertRequest {
                vectors: batch
                    .iter()
                    .map(|record| UpsertVector {
                        id: &record.id,
                        values: &record.vector,
                        metadata: &record.metadata,
                    })
                    .collect(),
                namespace: &self.namespace,
            };
            let body = serde_json::to_string(&request).map_err(|e| {
                LinkragError::VectorStore(format!("Failed to serialize upsert request: {}", e))
            })?;

            let response_text = self.post_json("vectors/upsert", &body)?;
            let response: UpsertResponse = serde_json::from_str(&response_text).map_err(|e| {
                LinkragError::VectorStore(format!("Failed to parse upsert response: {}", e))
            })?;
            debug!(
                "Pinecone upserted {} of {} vectors",
                response.upserted_count,
                batch.len()
            );
            upserted += response.upserted_count;
        }

        Ok(upserted)
    }

    #[inline]
    pub fn query_blocking(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let request = QueryRequest {
            namespace: &self.namespace,
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
        };
        let body = serde_json::to_string(&request).map_err(|e| {
            LinkragError::VectorStore(format!("Failed to serialize query request: {}", e))
        })?;

        let response_text = self.post_json("query", &body)?;
        let response: QueryResponse = serde_json::from_str(&response_text).map_err(|e| {
            LinkragError::VectorStore(format!("Failed to parse query response: {}", e))
        })?;

        Ok(response
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    fn post_json(&self, endpoint: &str, body: &str) -> Result<String> {
        let url = format!("{}/{}", self.host, endpoint);

        let mut response = self
            .agent
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| LinkragError::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let text = response.body_mut().read_to_string().map_err(|e| {
            LinkragError::Network(format!("Failed to read response body from {}: {}", url, e))
        })?;

        if !status.is_success() {
            error!("Pinecone returned {} for {}: {}", status, endpoint, text);
            return Err(LinkragError::VectorStore(format!(
                "Pinecone returned {}: {}",
                status, text
            )));
        }

        Ok(text)
    }
}

/// Accept a bare host name as well as a full URL
#[inline]
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn upsert(&self, records: Vec<StoreRecord>) -> Result<usize> {
        let records = dedupe_by_id(records);
        if records.is_empty() {
            debug!("No records to upsert");
            return Ok(0);
        }

        let client = self.clone();
        let count = tokio::task::spawn_blocking(move || client.upsert_blocking(&records))
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Upsert task failed: {}", e)))??;

        info!("Upserted {} records into namespace {}", count, self.namespace);
        Ok(count)
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let client = self.clone();
        let vector = vector.to_vec();

        tokio::task::spawn_blocking(move || client.query_blocking(&vector, top_k))
            .await
            .map_err(|e| LinkragError::VectorStore(format!("Query task failed: {}", e)))?
    }
}
