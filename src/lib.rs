//! # pdp-rag - Question Answering over the Indonesian Personal Data Protection Law
//!
//! Retrieval-augmented question answering over UU No. 27 Tahun 2022 tentang
//! Perlindungan Data Pribadi (UU PDP), exposed to AI assistants through a
//! Model Context Protocol (MCP) server.
//!
//! ## Overview
//!
//! The law is ingested once: its PDF is converted to text, split into one
//! chunk per article (Pasal) following the chapter (BAB) structure, the
//! definitions of Article 1 are extracted, and every record is embedded with
//! Gemini and stored in a Pinecone index. At query time the MCP tools embed
//! the question, retrieve the closest articles or definitions (optionally
//! restricted to a chapter) and render an Indonesian Markdown answer.
//!
//! ## Architecture
//!
//! ```text
//! PDF ──► indexer (clean, chunk, definitions, enrich) ──► KnowledgeBase JSON
//!                                                             │ ingest
//!                                                             ▼
//!                 EmbeddingProvider (Gemini) ──► VectorDatabase (Pinecone)
//!                                                             ▲
//! MCP client ──stdio──► PdpMcpServer ──► PdpTools ──► PdpRetriever
//! ```
//!
//! ## Modules
//!
//! - [`indexer`]: text cleaning, heading scanning, article chunking, definitions, enrichment
//! - [`knowledge_base`]: the persisted ingestion artifact
//! - [`embedding`]: embedding provider abstraction and the Gemini gateway
//! - [`vector_db`]: vector store abstraction, Pinecone gateway and an in-memory store
//! - [`retriever`]: filtered semantic search and context assembly
//! - [`tools`]: the six question-answering handlers
//! - [`mcp_server`]: MCP server with tools, prompts and a degraded fallback
//! - [`client`]: wiring and the ingestion pipeline
//! - [`config`]: configuration with environment variable overrides
//! - [`error`]: error types
//!
//! ## Usage Example
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Reads the default config file, GEMINI_API_KEY and PINECONE_API_KEY
//!     pdp_rag::mcp_server::serve_stdio(None).await
//! }
//! ```

/// Core client wiring providers together and running ingestion
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Embedding generation through the Gemini REST API
pub mod embedding;

/// Error types and utilities
pub mod error;

/// PDF extraction, cleaning and legal structure chunking
pub mod indexer;

/// Persisted knowledge base produced by extraction
pub mod knowledge_base;

/// MCP server implementation with tools and prompts
pub mod mcp_server;

/// Platform-specific default paths
pub mod paths;

/// Semantic retrieval and context assembly
pub mod retriever;

/// Question-answering tool handlers
pub mod tools;

/// MCP request types with JSON schema definitions
pub mod types;

/// Vector database abstraction supporting Pinecone and an in-memory store
pub mod vector_db;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{IngestReport, RagClient};
pub use config::Config;
pub use error::RagError;
pub use knowledge_base::KnowledgeBase;
pub use retriever::{PdpRetriever, RetrievalResult};
pub use tools::PdpTools;
