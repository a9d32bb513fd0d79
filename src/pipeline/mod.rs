// Pipeline module
// One chat turn: ingest linked pages, retrieve context, ask the model

pub mod context;


use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::completion::{ChatMessage, ChatModel};
use crate::config::ChatConfig;
use crate::crawler::PageScraper;
use crate::database::{StoreRecord, VectorIndex};
use crate::embeddings::Embedder;
use crate::urls::extract_urls;
use crate::{LinkragError, Result};

pub use context::{build_prompt, format_results};

pub const DEFAULT_TOP_K: usize = 5;
pub const QUERY_EMBEDDING_FAILED: &str = "Failed to create query embedding.";

/// Which step dropped a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStage {
    Scrape,
    Embed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestFailure {
    pub url: String,
    pub stage: IngestStage,
    pub reason: String,
}

/// Outcome of ingesting the URLs of one message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Records that were embedded and handed to the index, one per successful URL
    pub records: Vec<StoreRecord>,
    pub failures: Vec<IngestFailure>,
    /// Records the index actually wrote; pages sharing an id count once
    pub written: usize,
}

impl IngestReport {
    #[inline]
    pub fn attempted(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attempted() == 0
    }
}

/// The services one chat turn runs against
#[derive(Clone)]
pub struct ChatPipeline {
    scraper: Arc<dyn PageScraper>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
    top_k: usize,
    chat_config: ChatConfig,
}

impl ChatPipeline {
    #[inline]
    pub fn new(
        scraper: Arc<dyn PageScraper>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            scraper,
            embedder,
            index,
            chat,
            top_k: DEFAULT_TOP_K,
            chat_config: ChatConfig::default(),
        }
    }

    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[inline]
    pub fn with_chat_config(mut self, chat_config: ChatConfig) -> Self {
        self.chat_config = chat_config;
        self
    }

    /// Scrape and embed every URL concurrently, then upsert the successes in one call
    #[inline]
    pub async fn ingest_urls(&self, urls: &[String]) -> Result<IngestReport> {
        if urls.is_empty() {
            return Ok(IngestReport::default());
        }

        debug!("Ingesting {} URLs", urls.len());
        let outcomes = join_all(urls.iter().map(|url| self.ingest_one(url))).await;

        let mut report = IngestReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.records.push(record),
                Err(failure) => report.failures.push(failure),
            }
        }

        if report.records.is_empty() {
            info!("No pages to store ({} failed)", report.failures.len());
            return Ok(report);
        }

        report.written = self.index.upsert(report.records.clone()).await?;
        info!(
            "Stored {} records ({} failed)",
            report.written,
            report.failures.len()
        );
        Ok(report)
    }

    /// Ingest whatever URLs appear in `text`
    #[inline]
    pub async fn ingest_message(&self, text: &str) -> Result<IngestReport> {
        let urls = extract_urls(text);
        self.ingest_urls(&urls).await
    }

    async fn ingest_one(&self, url: &str) -> std::result::Result<StoreRecord, IngestFailure> {
        let page = self
            .scraper
            .scrape(url)
            .await
            .map_err(|e| IngestFailure {
                url: url.to_string(),
                stage: IngestStage::Scrape,
                reason: e.to_string(),
            })?;

        let vector = self.embedder.embed(&page.snippet).await.map_err(|e| {
            warn!("Failed to embed snippet of {}: {:#}", url, e);
            IngestFailure {
                url: url.to_string(),
                stage: IngestStage::Embed,
                reason: format!("{:#}", e),
            }
        })?;

        if vector.is_empty() {
            warn!("Embedding of {} came back empty", url);
            return Err(IngestFailure {
                url: url.to_string(),
                stage: IngestStage::Embed,
                reason: "Embedding contained no values".to_string(),
            });
        }

        Ok(StoreRecord::from_page(page, vector))
    }

    /// Embed the query and render the nearest stored pages as context text
    #[inline]
    pub async fn retrieve_context(&self, query: &str) -> Result<String> {
        let vector = self.embedder.embed(query).await.map_err(|e| {
            error!("Query embedding failed: {:#}", e);
            LinkragError::Embedding(QUERY_EMBEDDING_FAILED.to_string())
        })?;

        let matches = self.index.query(&vector, self.top_k).await?;
        debug!("Retrieved {} matches for query", matches.len());
        Ok(format_results(&matches))
    }

    /// Run one full turn for the conversation so far and return the model's reply
    #[inline]
    pub async fn answer(&self, messages: &[ChatMessage]) -> Result<String> {
        let user_message = last_user_message(messages);

        let report = self.ingest_message(user_message).await?;
        if !report.failures.is_empty() {
            warn!(
                "{} of {} linked pages could not be ingested",
                report.failures.len(),
                report.attempted()
            );
        }

        let context = self.retrieve_context(user_message).await?;
        let prompt = build_prompt(&self.chat_config, user_message, &context);

        self.chat
            .complete(&prompt)
            .await
            .map_err(|e| LinkragError::Chat(format!("{:#}", e)))
    }
}

/// Content of the last message, whatever its role; empty for an empty history
#[inline]
pub fn last_user_message(messages: &[ChatMessage]) -> &str {
    messages.last().map_or("", |message| message.content.as_str())
}
