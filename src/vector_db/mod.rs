// Pinecone is the production store, reached over its REST API
pub mod pinecone;
pub use pinecone::PineconeVectorDB;

// In-process store for tests and offline experiments
pub mod memory;
pub use memory::InMemoryVectorDB;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Metadata attached to a stored vector
pub type Metadata = serde_json::Map<String, Value>;

/// A vector with its identifier and metadata, as written by `upsert`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// One hit returned by `query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Equality conditions on metadata fields, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    conditions: Vec<(String, Value)>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field == value`; a later condition on the same field replaces the earlier one
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = value,
            None => self.conditions.push((field, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Pinecone filter document, `{"field": {"$eq": value}, ...}`
    pub fn to_pinecone_filter(&self) -> Value {
        let map: serde_json::Map<String, Value> = self
            .conditions
            .iter()
            .map(|(field, value)| (field.clone(), json!({ "$eq": value })))
            .collect();
        Value::Object(map)
    }

    /// Whether `metadata` satisfies every condition
    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.conditions
            .iter()
            .all(|(field, value)| metadata.get(field) == Some(value))
    }
}

/// Index statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_vectors: usize,
    pub dimension: Option<usize>,
    pub index_fullness: Option<f32>,
    /// Vector count per namespace, sorted by name
    pub namespaces: Vec<(String, usize)>,
}

/// Trait for vector database operations
#[async_trait::async_trait]
pub trait VectorDatabase: Send + Sync {
    /// Create the index if it does not exist yet. Safe to call repeatedly.
    async fn initialize(&self, dimension: usize) -> Result<()>;

    /// Insert or overwrite records; returns the number written
    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> Result<usize>;

    /// Nearest neighbors of `vector`, best first
    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        namespace: &str,
        filter: Option<&MetadataFilter>,
        include_metadata: bool,
    ) -> Result<Vec<VectorMatch>>;

    /// Get database statistics
    async fn get_statistics(&self) -> Result<DatabaseStats>;

    /// Remove every vector in `namespace`
    async fn delete_all(&self, namespace: &str) -> Result<()>;

    /// Get the database backend name
    fn backend_name(&self) -> &'static str;
}
