//! Semantic retrieval over the ingested law: query embedding, filtered
//! vector search and assembly of a bounded context string.

use crate::embedding::EmbeddingProvider;
use crate::vector_db::{Metadata, MetadataFilter, VectorDatabase, VectorMatch};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Approximate characters per token used for context budgets
pub const CHARS_PER_TOKEN: usize = 4;

/// Below this many remaining characters a truncated piece is not worth including
pub const MIN_TRUNCATED_PIECE: usize = 100;

const PIECE_SEPARATOR: &str = "\n\n---\n\n";
const TRUNCATION_MARKER: &str = "...";

/// One search hit with its stored metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub id: String,
    pub score: f32,
    /// The `content` metadata field of an article, or the `definisi` field
    /// of a definition; empty when neither is present
    pub content: String,
    pub metadata: Metadata,
}

impl From<VectorMatch> for RetrievalResult {
    fn from(hit: VectorMatch) -> Self {
        let content = hit
            .metadata
            .get("content")
            .or_else(|| hit.metadata.get("definisi"))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Self {
            id: hit.id,
            score: hit.score,
            content,
            metadata: hit.metadata,
        }
    }
}

impl RetrievalResult {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Citation for this hit: `full_reference` for articles, `{istilah} ({sumber})`
    /// for definitions, else `Pasal {pasal}`
    pub fn reference(&self) -> String {
        if let Some(reference) = self.metadata_str("full_reference") {
            return reference.to_string();
        }
        match (self.metadata_str("istilah"), self.metadata_str("sumber")) {
            (Some(istilah), Some(sumber)) => format!("{} ({})", istilah, sumber),
            (Some(istilah), None) => istilah.to_string(),
            _ => format!("Pasal {}", self.metadata_str("pasal").unwrap_or("N/A")),
        }
    }

    /// `[reference]` followed by the content on the next line
    pub fn to_context(&self) -> String {
        format!("[{}]\n{}", self.reference(), self.content)
    }
}

/// Retriever over an embedding provider and a vector store
pub struct PdpRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    vector_db: Arc<dyn VectorDatabase>,
    namespace: String,
}

impl PdpRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        vector_db: Arc<dyn VectorDatabase>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            vector_db,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Search with optional `type` and `bab` equality filters, results in store order
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter_type: Option<&str>,
        filter_bab: Option<&str>,
    ) -> Result<Vec<RetrievalResult>> {
        let query_vector = self
            .embedder
            .embed_query(query)
            .await
            .context("Failed to embed query")?;

        let mut filter = MetadataFilter::new();
        if let Some(kind) = filter_type {
            filter = filter.eq("type", kind);
        }
        if let Some(bab) = filter_bab {
            filter = filter.eq("bab", bab);
        }

        tracing::debug!(
            "Searching top {} for {:?} (type={:?}, bab={:?})",
            top_k,
            query,
            filter_type,
            filter_bab
        );

        let filter = (!filter.is_empty()).then_some(filter);
        let matches = self
            .vector_db
            .query(query_vector, top_k, &self.namespace, filter.as_ref(), true)
            .await
            .context("Failed to query vector database")?;

        Ok(matches.into_iter().map(RetrievalResult::from).collect())
    }

    /// Search articles only, optionally within one chapter
    pub async fn search_pasal(
        &self,
        query: &str,
        top_k: usize,
        bab: Option<&str>,
    ) -> Result<Vec<RetrievalResult>> {
        self.search(query, top_k, Some("pasal"), bab).await
    }

    /// Search Article 1 definitions only
    pub async fn search_definisi(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        self.search(query, top_k, Some("definisi"), None).await
    }

    /// Retrieve and format context for a question
    pub async fn get_context_for_query(
        &self,
        query: &str,
        top_k: usize,
        max_tokens: usize,
    ) -> Result<(String, Vec<RetrievalResult>)> {
        let results = self.search(query, top_k, None, None).await?;
        let context = build_context(&results, max_tokens);
        Ok((context, results))
    }
}

/// Concatenate hits into a context string of at most `max_tokens * 4` characters.
///
/// The first piece that does not fit is cut to the remaining budget (the
/// `...` marker included) when at least [`MIN_TRUNCATED_PIECE`] characters
/// remain; assembly stops there either way.
pub fn build_context(results: &[RetrievalResult], max_tokens: usize) -> String {
    let budget = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    let separator_len = PIECE_SEPARATOR.chars().count();

    let mut pieces: Vec<String> = Vec::new();
    let mut used = 0;

    for result in results {
        let piece = result.to_context();
        let piece_len = piece.chars().count();
        let overhead = if pieces.is_empty() { 0 } else { separator_len };

        if used + overhead + piece_len <= budget {
            used += overhead + piece_len;
            pieces.push(piece);
            continue;
        }

        let remaining = budget.saturating_sub(used + overhead);
        if remaining >= MIN_TRUNCATED_PIECE {
            let keep = remaining - TRUNCATION_MARKER.len();
            let truncated: String = piece.chars().take(keep).collect();
            pieces.push(format!("{}{}", truncated, TRUNCATION_MARKER));
        }
        break;
    }

    pieces.join(PIECE_SEPARATOR)
}
