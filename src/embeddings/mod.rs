// Embeddings module
// The seam between the pipeline and whichever hosted model produces vectors

use anyhow::Result;
use async_trait::async_trait;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one non-empty string; empty input is an error, not a zero vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
