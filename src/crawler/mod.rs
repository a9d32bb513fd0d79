pub mod extractor;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use ureq::Agent;

use crate::config::ScraperConfig;

pub use self::extractor::{ScrapedPage, extract_page};

/// Why a single URL produced no page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Unsupported content type '{content_type}' from {url}")]
    NotHtml { url: String, content_type: String },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Scrape task for {url} did not complete: {message}")]
    Task { url: String, message: String },
}

/// Source of page metadata for the ingest step
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError>;
}

/// Scraper that fetches pages over plain HTTP with a fixed user agent
#[derive(Debug, Clone)]
pub struct HttpScraper {
    agent: Agent,
    snippet_length: usize,
}

impl HttpScraper {
    #[inline]
    pub fn new(config: &ScraperConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .user_agent(&config.user_agent)
            .build()
            .into();

        Self {
            agent,
            snippet_length: config.snippet_length,
        }
    }

    /// Fetch and extract one page on the current thread
    #[inline]
    pub fn scrape_blocking(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        let html = self.fetch_html(url)?;
        Ok(extract_page(url, &html, self.snippet_length))
    }

    fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("Making HTTP GET request to: {}", url);

        let mut response = self.agent.get(url).call().map_err(|e| match e {
            ureq::Error::StatusCode(status) => ScrapeError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Timeout(_) => ScrapeError::Timeout {
                url: url.to_string(),
            },
            other => ScrapeError::Transport {
                url: url.to_string(),
                message: other.to_string(),
            },
        })?;

        if let Some(content_type) = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
        {
            if !is_html_content_type(content_type) {
                return Err(ScrapeError::NotHtml {
                    url: url.to_string(),
                    content_type: content_type.to_string(),
                });
            }
        }

        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ScrapeError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        debug!("Successfully read {} bytes from {}", text.len(), url);
        Ok(text)
    }
}

impl Default for HttpScraper {
    #[inline]
    fn default() -> Self {
        Self::new(&ScraperConfig::default())
    }
}

#[async_trait]
impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<ScrapedPage, ScrapeError> {
        let scraper = self.clone();
        let owned_url = url.to_string();

        let result = tokio::task::spawn_blocking(move || scraper.scrape_blocking(&owned_url))
            .await
            .unwrap_or_else(|e| {
                Err(ScrapeError::Task {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            });

        if let Err(e) = &result {
            warn!("Failed to scrape {}: {}", url, e);
        }
        result
    }
}

/// HTML and XHTML are accepted; `text/plain` and binary types are not
#[inline]
pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "text/html" || mime == "application/xhtml+xml"
}
