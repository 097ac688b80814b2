//! Deterministic providers shared by unit tests

use crate::embedding::EmbeddingProvider;
use crate::indexer::{Chunk, DEFAULT_DEFINITION_SOURCE, Definition, EnrichedChunk};
use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseMetadata};
use crate::vector_db::{InMemoryVectorDB, VectorDatabase, VectorRecord};
use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const KEYWORDS: [&str; 6] = ["hak", "kewajiban", "sanksi", "data", "pidana", "definisi"];

/// One dimension per keyword, 1.0 when the lower-cased text contains it
#[derive(Default)]
pub(crate) struct KeywordEmbedder {
    pub(crate) batch_calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub(crate) fn vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        KEYWORDS
            .iter()
            .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
            .collect()
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len()
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Always fails, for error propagation tests
pub(crate) struct FailingEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed_document(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("embedding service unavailable")
    }

    async fn embed_batch(&self, _texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("embedding service unavailable")
    }

    fn dimension(&self) -> usize {
        KEYWORDS.len()
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// A stored article or definition: `(id, type, bab, content)`.
///
/// Definition content is written as `"{istilah}: {definisi}"`.
pub(crate) type Doc<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Knowledge base holding `docs`; articles get the chapter title `JUDUL`
/// and no neighbor context, so each is embedded from its own content
fn knowledge_base(docs: &[Doc<'_>]) -> KnowledgeBase {
    let mut pasal = Vec::new();
    let mut definisi = Vec::new();

    for (id, kind, bab, content) in docs {
        if *kind == "definisi" {
            let (istilah, text) = content.split_once(": ").unwrap_or(("", content));
            definisi.push(Definition {
                id: id.to_string(),
                nomor: id.trim_start_matches("definisi_").to_string(),
                istilah: istilah.to_string(),
                definisi: text.to_string(),
                sumber: DEFAULT_DEFINITION_SOURCE.to_string(),
            });
        } else {
            let number = id.trim_start_matches("pasal_");
            pasal.push(EnrichedChunk {
                chunk: Chunk::new(bab, "JUDUL", number, content.to_string()),
                content_with_context: String::new(),
            });
        }
    }

    KnowledgeBase {
        metadata: KnowledgeBaseMetadata {
            source: "UU PDP".to_string(),
            total_pasal: pasal.len(),
            total_definisi: definisi.len(),
            generated_at: None,
        },
        pasal,
        definisi,
        raw_text: String::new(),
    }
}

/// In-memory store seeded the way ingestion writes records, in the default namespace
pub(crate) async fn seeded_db(docs: &[Doc<'_>]) -> Arc<InMemoryVectorDB> {
    let db = Arc::new(InMemoryVectorDB::new());
    let records = knowledge_base(docs)
        .to_vector_inputs()
        .into_iter()
        .map(|input| VectorRecord {
            id: input.id,
            values: KeywordEmbedder::vector(&input.text),
            metadata: input.metadata,
        })
        .collect();

    db.upsert(records, "")
        .await
        .expect("seeding the in-memory store cannot fail");
    db
}

/// A small slice of the law covering every tool
pub(crate) const SAMPLE_DOCS: &[Doc<'static>] = &[
    ("pasal_5", "pasal", "IV", "Subjek Data Pribadi berhak mendapatkan informasi, ini hak dasar"),
    ("pasal_7", "pasal", "IV", "Subjek Data Pribadi berhak mendapatkan akses data, hak akses"),
    ("pasal_20", "pasal", "VI", "Pengendali Data Pribadi wajib memiliki dasar pemrosesan, kewajiban"),
    ("pasal_35", "pasal", "VIII", "Pengendali wajib melindungi data, kewajiban keamanan"),
    ("pasal_57", "pasal", "X", "Pelanggaran dikenai sanksi administratif berupa teguran"),
    ("pasal_67", "pasal", "XIV", "Setiap Orang dipidana dengan sanksi pidana penjara"),
    ("definisi_1", "definisi", "", "Data Pribadi: data tentang orang perseorangan"),
    ("definisi_2", "definisi", "", "Subjek Data Pribadi: orang perseorangan yang pada dirinya melekat data"),
];
