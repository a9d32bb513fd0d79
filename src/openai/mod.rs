
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::completion::{ChatMessage, ChatModel};
use crate::config::OpenAiConfig;
use crate::embeddings::Embedder;

/// Blocking client for the OpenAI embeddings and chat-completions endpoints
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    embedding_model: String,
    chat_model: String,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .require_api_key()
            .context("Failed to create OpenAI client")?
            .trim()
            .to_string();

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            agent: build_agent(Duration::from_secs(config.timeout_seconds)),
        })
    }

    /// Generate an embedding for a single text input
    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            bail!("Refusing to embed empty text");
        }

        debug!(
            "Generating embedding with {} for text (length: {})",
            self.embedding_model,
            text.len()
        );

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize embedding request")?;

        let response_text = self
            .post_json("embeddings", &request_json)
            .context("Failed to generate embedding")?;

        let response: EmbeddingResponse = serde_json::from_str(&response_text)
            .context("Failed to parse embedding response")?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| anyhow!("Embedding response contained no vector"))?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    /// Run one non-streaming chat completion and return the first choice's text
    #[inline]
    pub fn chat_completion(&self, messages: &[ChatMessage]) -> Result<String> {
        debug!(
            "Requesting chat completion from {} with {} messages",
            self.chat_model,
            messages.len()
        );

        let request = CompletionRequest {
            model: &self.chat_model,
            messages,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize completion request")?;

        let response_text = self
            .post_json("chat/completions", &request_json)
            .context("Failed to get chat completion")?;

        let response: CompletionResponse = serde_json::from_str(&response_text)
            .context("Failed to parse completion response")?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    fn post_json(&self, endpoint: &str, body: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(body)
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        let text = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map_or(text, |parsed| parsed.error.message);
            error!("OpenAI returned {} for {}: {}", status, endpoint, message);
            bail!("OpenAI returned {}: {}", status, message);
        }

        Ok(text)
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
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let client = self.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || client.generate_embedding(&text))
            .await
            .context("Embedding task panicked or was cancelled")?
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let client = self.clone();
        let messages = messages.to_vec();

        tokio::task::spawn_blocking(move || client.chat_completion(&messages))
            .await
            .context("Completion task panicked or was cancelled")?
    }
}
