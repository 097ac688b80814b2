mod gemini;

pub use gemini::GeminiEmbedder;

use anyhow::Result;

/// Trait for embedding generation
///
/// Documents and queries may be embedded differently by the remote model
/// (asymmetric retrieval). Providers without a separate query mode keep the
/// default [`EmbeddingProvider::embed_query`], which embeds as a document.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text in document mode
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts in document mode. Output order and length match the input.
    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Embed a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_document(text).await
    }

    /// Get the dimension of the embeddings
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}
