//! Core library client for pdp-rag
//!
//! Wires the embedding provider, the vector store and the retriever together
//! and runs the ingestion pipeline. The MCP server and the CLI are thin
//! wrappers around this type.

use crate::config::Config;
use crate::embedding::{EmbeddingProvider, GeminiEmbedder};
use crate::error::RagError;
use crate::knowledge_base::KnowledgeBase;
use crate::retriever::{PdpRetriever, RetrievalResult};
use crate::vector_db::{DatabaseStats, PineconeVectorDB, VectorDatabase, VectorRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of an ingestion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub pasal: usize,
    pub definisi: usize,
    pub vectors_upserted: usize,
    pub batches: usize,
    pub duration_ms: u64,
}

/// Main client for interacting with the RAG system
///
/// # Example
///
/// ```no_run
/// use pdp_rag::{KnowledgeBase, RagClient};
/// use std::path::Path;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     // Requires GEMINI_API_KEY and PINECONE_API_KEY
///     let client = RagClient::new()?;
///
///     let kb = KnowledgeBase::load(Path::new("pdp_knowledge.json"))?;
///     let report = client.ingest(&kb, false).await?;
///     println!("Upserted {} vectors", report.vectors_upserted);
///
///     let hits = client.query("Apa hak subjek data pribadi?", 3).await?;
///     for hit in hits {
///         println!("{} ({:.3})", hit.reference(), hit.score);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RagClient {
    pub(crate) embedding_provider: Arc<dyn EmbeddingProvider>,
    pub(crate) vector_db: Arc<dyn VectorDatabase>,
    pub(crate) retriever: Arc<PdpRetriever>,
    pub(crate) config: Arc<Config>,
}

impl RagClient {
    /// Create a client from the default configuration file and environment
    pub fn new() -> Result<Self, RagError> {
        Self::with_config(Config::new()?)
    }

    /// Create a client backed by Gemini and Pinecone.
    ///
    /// Fails fast when either API key is missing; no network call is made.
    pub fn with_config(config: Config) -> Result<Self, RagError> {
        let embedder = Arc::new(GeminiEmbedder::new(&config.embedding)?);
        let vector_db = Arc::new(PineconeVectorDB::new(&config.vector_db)?);
        Ok(Self::with_providers(embedder, vector_db, config))
    }

    /// Create a client over explicit providers
    pub fn with_providers(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_db: Arc<dyn VectorDatabase>,
        config: Config,
    ) -> Self {
        let retriever = Arc::new(PdpRetriever::new(
            embedding_provider.clone(),
            vector_db.clone(),
            config.vector_db.namespace.clone(),
        ));

        tracing::info!(
            "RAG client ready: embeddings={} ({}d), vector store={}",
            embedding_provider.model_name(),
            embedding_provider.dimension(),
            vector_db.backend_name()
        );

        Self {
            embedding_provider,
            vector_db,
            retriever,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn retriever(&self) -> Arc<PdpRetriever> {
        self.retriever.clone()
    }

    pub fn embedding_dimension(&self) -> usize {
        self.embedding_provider.dimension()
    }

    /// Embed and upsert every article and definition of `kb`.
    ///
    /// The index is created first when missing. With `reset`, the namespace is
    /// emptied before anything is written.
    pub async fn ingest(&self, kb: &KnowledgeBase, reset: bool) -> Result<IngestReport> {
        let start = Instant::now();
        let namespace = self.config.vector_db.namespace.as_str();
        let batch_size = self.config.ingestion.upsert_batch_size.max(1);

        self.vector_db
            .initialize(self.embedding_provider.dimension())
            .await
            .context("Failed to initialize vector index")?;

        if reset {
            tracing::info!("Clearing namespace '{}' before ingestion", namespace);
            self.vector_db
                .delete_all(namespace)
                .await
                .context("Failed to clear namespace")?;
        }

        let inputs = kb.to_vector_inputs();
        let total_batches = inputs.len().div_ceil(batch_size);
        let mut upserted = 0;

        for (i, batch) in inputs.chunks(batch_size).enumerate() {
            tracing::info!(
                "Ingesting batch {}/{} ({} records)",
                i + 1,
                total_batches,
                batch.len()
            );

            let texts: Vec<String> = batch.iter().map(|input| input.text.clone()).collect();
            let embeddings = self
                .embedding_provider
                .embed_batch(texts)
                .await
                .with_context(|| format!("Failed to embed batch {}", i + 1))?;

            let records: Vec<VectorRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(input, values)| VectorRecord {
                    id: input.id.clone(),
                    values,
                    metadata: input.metadata.clone(),
                })
                .collect();

            upserted += self
                .vector_db
                .upsert(records, namespace)
                .await
                .with_context(|| format!("Failed to upsert batch {}", i + 1))?;
        }

        let report = IngestReport {
            pasal: kb.pasal.len(),
            definisi: kb.definisi.len(),
            vectors_upserted: upserted,
            batches: total_batches,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Ingestion complete: {} vectors in {} batches ({} ms)",
            report.vectors_upserted,
            report.batches,
            report.duration_ms
        );

        Ok(report)
    }

    /// Unfiltered semantic search
    pub async fn query(&self, question: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        self.retriever.search(question, top_k, None, None).await
    }

    pub async fn statistics(&self) -> Result<DatabaseStats> {
        self.vector_db
            .get_statistics()
            .await
            .context("Failed to get vector database statistics")
    }

    /// Remove every vector in the configured namespace
    pub async fn clear(&self) -> Result<()> {
        self.vector_db
            .delete_all(&self.config.vector_db.namespace)
            .await
            .context("Failed to clear vector database")
    }
}

#[cfg(test)]
mod tests;
