use anyhow::{Context, Result};
use console::style;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::completion::{ChatMessage, ChatModel};
use crate::config::{Config, VectorBackend};
use crate::crawler::{HttpScraper, PageScraper};
use crate::database::{LanceVectorStore, PineconeClient, VectorIndex};
use crate::embeddings::Embedder;
use crate::openai::OpenAiClient;
use crate::pipeline::{ChatPipeline, IngestReport, IngestStage};
use crate::server::{self, AppState};

/// Construct the configured vector backend
#[inline]
pub async fn build_index(config: &Config) -> Result<Arc<dyn VectorIndex>> {
    match config.vector_store.backend {
        VectorBackend::Pinecone => {
            let client = PineconeClient::new(&config.vector_store)
                .context("Failed to create Pinecone client")?;
            debug!("Using Pinecone namespace {}", client.namespace());
            Ok(Arc::new(client))
        }
        VectorBackend::Lancedb => {
            let store = LanceVectorStore::from_config(config)
                .await
                .context("Failed to open LanceDB vector store")?;
            debug!("Using LanceDB table {}", store.table_name());
            Ok(Arc::new(store))
        }
    }
}

/// Wire every client the configuration describes into one pipeline
#[inline]
pub async fn build_pipeline(config: &Config) -> Result<ChatPipeline> {
    let openai = Arc::new(OpenAiClient::new(&config.openai)?);
    let scraper: Arc<dyn PageScraper> = Arc::new(HttpScraper::new(&config.scraper));
    let index = build_index(config).await?;

    Ok(ChatPipeline::new(
        scraper,
        Arc::clone(&openai) as Arc<dyn Embedder>,
        index,
        openai as Arc<dyn ChatModel>,
    )
    .with_top_k(config.vector_store.top_k)
    .with_chat_config(config.chat.clone()))
}

/// Start the HTTP server; `host` and `port` override the configured address
#[inline]
pub async fn serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    let pipeline = build_pipeline(config).await?;
    info!(
        "Serving with {} backend, namespace {}",
        config.vector_store.backend.as_str(),
        config.vector_store.namespace
    );
    eprintln!(
        "{} http://{}",
        style("linkrag listening on").bold().green(),
        addr
    );

    server::serve(addr, AppState::new(pipeline)).await
}

/// Scrape, embed and store the given URLs
#[inline]
pub async fn ingest(config: &Config, urls: &[String]) -> Result<IngestReport> {
    let pipeline = build_pipeline(config).await?;
    let report = pipeline.ingest_urls(urls).await?;
    print_report(&report);
    Ok(report)
}

/// Run one chat turn for a single user message and print the reply
#[inline]
pub async fn ask(config: &Config, message: &str) -> Result<String> {
    let pipeline = build_pipeline(config).await?;
    let reply = pipeline.answer(&[ChatMessage::user(message)]).await?;
    println!("{}", reply);
    Ok(reply)
}

fn print_report(report: &IngestReport) {
    println!(
        "{} {} records from {} of {} pages",
        style("Stored").bold().green(),
        report.written,
        report.records.len(),
        report.attempted()
    );

    for record in &report.records {
        println!("  {} {} ({})", style("✓").green(), record.id, record.metadata.url);
    }

    for failure in &report.failures {
        let stage = match failure.stage {
            IngestStage::Scrape => "scrape",
            IngestStage::Embed => "embed",
        };
        println!(
            "  {} {} [{}] {}",
            style("✗").red(),
            failure.url,
            stage,
            style(&failure.reason).dim()
        );
    }
}
