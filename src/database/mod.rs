// Database module
// Vector index seam plus the hosted (Pinecone) and local (LanceDB) backends

pub mod lance;
pub mod pinecone;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::Result;
use crate::crawler::ScrapedPage;

pub use lance::LanceVectorStore;
pub use pinecone::PineconeClient;

/// Metadata stored alongside every vector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: String,
    pub snippet: String,
}

/// One record written by upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// The page title, or the URL when the title is empty; not unique
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: PageMetadata,
}

/// A stored record returned by a similarity query, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    /// Higher is more similar
    pub score: f32,
    pub metadata: PageMetadata,
}

impl StoreRecord {
    #[inline]
    pub fn from_page(page: ScrapedPage, vector: Vec<f32>) -> Self {
        let id = if page.title.is_empty() {
            page.url.clone()
        } else {
            page.title.clone()
        };

        Self {
            id,
            vector,
            metadata: PageMetadata {
                url: page.url,
                title: page.title,
                description: page.description,
                snippet: page.snippet,
            },
        }
    }
}

/// Namespaced nearest-neighbour index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Write records, replacing any existing record with the same id.
    /// Returns how many records were written; an empty list is a no-op.
    async fn upsert(&self, records: Vec<StoreRecord>) -> Result<usize>;

    /// Up to `top_k` nearest records, most similar first
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>>;
}

/// Keep only the last record for each id, preserving first-seen order
#[inline]
pub fn dedupe_by_id(records: Vec<StoreRecord>) -> Vec<StoreRecord> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<StoreRecord> = Vec::with_capacity(records.len());

    for record in records {
        if let Some(&index) = positions.get(&record.id) {
            unique[index] = record;
        } else {
            positions.insert(record.id.clone(), unique.len());
            unique.push(record);
        }
    }

    unique
}
