//! The extracted knowledge base artifact: chunked articles, definitions and a
//! raw-text sample, persisted as pretty-printed JSON between `extract` and `ingest`.

use crate::error::KnowledgeBaseError;
use crate::indexer::{
    Definition, EnrichedChunk, chunk_document, enrich_chunks, extract_definitions,
    extract_text_from_pdf,
};
use crate::vector_db::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Characters of extracted text kept as a sample in `raw_text`
pub const RAW_TEXT_SAMPLE_CHARS: usize = 5000;

/// Upper bound for text stored in vector metadata fields
pub const METADATA_TEXT_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseMetadata {
    pub source: String,
    pub total_pasal: usize,
    pub total_definisi: usize,
    /// RFC 3339 timestamp of extraction
    #[serde(default)]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub metadata: KnowledgeBaseMetadata,
    pub pasal: Vec<EnrichedChunk>,
    pub definisi: Vec<Definition>,
    #[serde(default)]
    pub raw_text: String,
}

/// One record ready for embedding and upsert
#[derive(Debug, Clone, PartialEq)]
pub struct VectorInput {
    pub id: String,
    /// Text sent to the embedding API
    pub text: String,
    pub metadata: Metadata,
}

impl KnowledgeBase {
    /// Run the full segmentation pipeline over extracted document text
    pub fn from_text(text: &str, source: &str) -> Self {
        let chunks = chunk_document(text);
        let pasal = enrich_chunks(&chunks);
        let definisi = extract_definitions(text);

        tracing::info!(
            "Built knowledge base: {} pasal, {} definisi",
            pasal.len(),
            definisi.len()
        );

        Self {
            metadata: KnowledgeBaseMetadata {
                source: source.to_string(),
                total_pasal: pasal.len(),
                total_definisi: definisi.len(),
                generated_at: Some(chrono::Utc::now().to_rfc3339()),
            },
            pasal,
            definisi,
            raw_text: format!("{}...", truncate_chars(text, RAW_TEXT_SAMPLE_CHARS)),
        }
    }

    /// Extract a PDF and build the knowledge base from its text
    pub fn from_pdf(path: &Path, source: &str) -> Result<Self, KnowledgeBaseError> {
        let text =
            extract_text_from_pdf(path).map_err(|e| KnowledgeBaseError::PdfExtractionFailed {
                path: path.display().to_string(),
                reason: format!("{:#}", e),
            })?;
        Ok(Self::from_text(&text, source))
    }

    /// Write the artifact as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), KnowledgeBaseError> {
        let save_failed = |reason: String| KnowledgeBaseError::SaveFailed {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| save_failed(e.to_string()))?;

        tracing::info!("Saved knowledge base to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        if !path.exists() {
            return Err(KnowledgeBaseError::NotFound(path.display().to_string()));
        }

        let malformed = |reason: String| KnowledgeBaseError::Malformed {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        let kb: Self = serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))?;

        tracing::debug!(
            "Loaded knowledge base from {}: {} pasal, {} definisi",
            path.display(),
            kb.pasal.len(),
            kb.definisi.len()
        );
        Ok(kb)
    }

    /// Records for ingestion, articles first then definitions
    pub fn to_vector_inputs(&self) -> Vec<VectorInput> {
        let articles = self.pasal.iter().map(|enriched| {
            let chunk = &enriched.chunk;
            let text = if enriched.content_with_context.is_empty() {
                chunk.content.clone()
            } else {
                enriched.content_with_context.clone()
            };

            let mut metadata = Metadata::new();
            metadata.insert("bab".into(), Value::from(chunk.bab.as_str()));
            metadata.insert("bab_title".into(), Value::from(chunk.bab_title.as_str()));
            metadata.insert("pasal".into(), Value::from(chunk.pasal.as_str()));
            metadata.insert(
                "content".into(),
                Value::from(truncate_chars(&chunk.content, METADATA_TEXT_LIMIT)),
            );
            metadata.insert(
                "full_reference".into(),
                Value::from(chunk.full_reference.as_str()),
            );
            metadata.insert("type".into(), Value::from("pasal"));

            VectorInput {
                id: chunk.id.clone(),
                text,
                metadata,
            }
        });

        let definitions = self.definisi.iter().map(|def| {
            let mut metadata = Metadata::new();
            metadata.insert("istilah".into(), Value::from(def.istilah.as_str()));
            metadata.insert(
                "definisi".into(),
                Value::from(truncate_chars(&def.definisi, METADATA_TEXT_LIMIT)),
            );
            metadata.insert("sumber".into(), Value::from(def.sumber.as_str()));
            metadata.insert("type".into(), Value::from("definisi"));

            VectorInput {
                id: def.id.clone(),
                text: format!("{}: {}", def.istilah, def.definisi),
                metadata,
            }
        });

        articles.chain(definitions).collect()
    }
}

/// First `max` characters of `text`, cut on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}
