//! Legal-document segmentation: text cleaning, chapter/article scanning,
//! definition extraction and neighbor-context enrichment.
//!
//! The pipeline is `raw text -> chunk_document -> enrich_chunks`, with
//! `extract_definitions` run over the same raw text.

mod chunker;
mod cleaner;
mod definitions;
mod enricher;
mod pdf_extractor;
mod scanner;

pub use chunker::{LegalChunker, MIN_CONTENT_LENGTH, chunk_document};
pub use cleaner::clean_text;
pub use definitions::{DEFAULT_DEFINITION_SOURCE, DefinitionExtractor, extract_definitions};
pub use enricher::{CONTEXT_PREVIEW_CHARS, enrich_chunks};
pub use pdf_extractor::{extract_text_from_pdf, join_pages};
pub use scanner::{Heading, HeadingKind, HeadingScanner, RegexHeadingScanner};

use serde::{Deserialize, Serialize};

/// One article (Pasal) of the document, tagged with its enclosing chapter (BAB)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier, `pasal_{number}`
    pub id: String,
    /// Chapter roman numeral (e.g. "IV")
    pub bab: String,
    /// Chapter title (e.g. "HAK SUBJEK DATA PRIBADI")
    pub bab_title: String,
    /// Article number as written in the document
    pub pasal: String,
    /// Cleaned article body
    pub content: String,
    /// Human-readable citation, `BAB {bab} - {bab_title}, Pasal {pasal}`
    pub full_reference: String,
}

impl Chunk {
    pub fn new(bab: &str, bab_title: &str, pasal: &str, content: String) -> Self {
        Self {
            id: format!("pasal_{}", pasal),
            bab: bab.to_string(),
            bab_title: bab_title.to_string(),
            pasal: pasal.to_string(),
            content,
            full_reference: format!("BAB {} - {}, Pasal {}", bab, bab_title, pasal),
        }
    }
}

/// A chunk plus previews of its neighbors, used as the embedding input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    /// `content` surrounded by truncated previews of the previous and next article
    pub content_with_context: String,
}

/// A term declared in the numbered definition list of Article 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Stable identifier, `definisi_{nomor}`
    pub id: String,
    /// Item number in the definition list
    pub nomor: String,
    /// Defined term
    pub istilah: String,
    /// Cleaned definition text
    pub definisi: String,
    /// Source citation
    pub sumber: String,
}
