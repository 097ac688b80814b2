use super::{DatabaseStats, MetadataFilter, VectorDatabase, VectorMatch, VectorRecord};
use crate::error::VectorDbError;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;

/// Vector store kept entirely in process memory, scored by cosine similarity.
///
/// Records keep their insertion order within a namespace so equal scores
/// come back in a stable order.
pub struct InMemoryVectorDB {
    namespaces: RwLock<HashMap<String, Vec<VectorRecord>>>,
    dimension: RwLock<Option<usize>>,
}

impl InMemoryVectorDB {
    #[must_use]
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            dimension: RwLock::new(None),
        }
    }
}

impl Default for InMemoryVectorDB {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorDB").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn poisoned<E: std::fmt::Display>(e: E) -> VectorDbError {
    VectorDbError::LockPoisoned(e.to_string())
}

#[async_trait::async_trait]
impl VectorDatabase for InMemoryVectorDB {
    async fn initialize(&self, dimension: usize) -> Result<()> {
        let mut current = self.dimension.write().map_err(poisoned)?;
        match *current {
            Some(existing) if existing != dimension => {
                tracing::warn!(
                    "In-memory store already initialized with dimension {}, requested {}",
                    existing,
                    dimension
                );
            }
            Some(_) => {}
            None => *current = Some(dimension),
        }
        Ok(())
    }

    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> Result<usize> {
        let mut namespaces = self.namespaces.write().map_err(poisoned)?;
        let stored = namespaces.entry(namespace.to_string()).or_default();
        let count = records.len();

        for record in records {
            match stored.iter_mut().find(|existing| existing.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(count)
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        namespace: &str,
        filter: Option<&MetadataFilter>,
        include_metadata: bool,
    ) -> Result<Vec<VectorMatch>> {
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        let Some(stored) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<VectorMatch> = stored
            .iter()
            .filter(|record| filter.is_none_or(|f| f.matches(&record.metadata)))
            .map(|record| VectorMatch {
                id: record.id.clone(),
                score: cosine_similarity(&vector, &record.values),
                metadata: if include_metadata {
                    record.metadata.clone()
                } else {
                    Default::default()
                },
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn get_statistics(&self) -> Result<DatabaseStats> {
        let namespaces = self.namespaces.read().map_err(poisoned)?;
        let dimension = *self.dimension.read().map_err(poisoned)?;

        let mut counts: Vec<(String, usize)> = namespaces
            .iter()
            .map(|(name, records)| (name.clone(), records.len()))
            .collect();
        counts.sort();

        Ok(DatabaseStats {
            total_vectors: counts.iter().map(|(_, n)| n).sum(),
            dimension,
            index_fullness: None,
            namespaces: counts,
        })
    }

    async fn delete_all(&self, namespace: &str) -> Result<()> {
        let mut namespaces = self.namespaces.write().map_err(poisoned)?;
        namespaces.remove(namespace);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}
