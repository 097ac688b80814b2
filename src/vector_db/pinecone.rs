use super::{DatabaseStats, MetadataFilter, VectorDatabase, VectorMatch, VectorRecord};
use crate::config::{VectorDbConfig, require_credential};
use crate::error::{RagError, VectorDbError};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::OnceCell;

const API_VERSION: &str = "2024-07";

/// Pinecone serverless index accessed through the REST API.
///
/// Control-plane calls (list, describe, create) go to `controller_url`; data-plane
/// calls go to the index host, which is resolved once on first use.
pub struct PineconeVectorDB {
    client: reqwest::Client,
    api_key: String,
    controller_url: String,
    index_name: String,
    metric: String,
    cloud: String,
    region: String,
    configured_host: Option<String>,
    host: OnceCell<String>,
}

impl std::fmt::Debug for PineconeVectorDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeVectorDB")
            .field("api_key", &"<redacted>")
            .field("controller_url", &self.controller_url)
            .field("index_name", &self.index_name)
            .field("host", &self.host.get())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<VectorMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceSummary {
    #[serde(default)]
    vector_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceSummary>,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    index_fullness: Option<f32>,
    #[serde(default)]
    total_vector_count: usize,
}

impl PineconeVectorDB {
    /// Create a client from configuration.
    ///
    /// Fails with `ConfigError::MissingRequired("PINECONE_API_KEY")` when no key is set.
    /// No network call is made until the first operation.
    pub fn new(config: &VectorDbConfig) -> Result<Self, RagError> {
        let api_key = require_credential(config.api_key.as_deref(), "PINECONE_API_KEY")?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            controller_url: config.controller_url.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
            metric: config.metric.clone(),
            cloud: config.cloud.clone(),
            region: config.region.clone(),
            configured_host: config
                .index_host
                .as_deref()
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(normalize_host),
            host: OnceCell::new(),
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        tracing::debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| VectorDbError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorDbError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let parsed = response
            .json::<T>()
            .await
            .map_err(|e| VectorDbError::InvalidResponse(e.to_string()))?;
        Ok(parsed)
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let url = format!("{}/indexes", self.controller_url);
        let list: IndexList = self.send(self.request(reqwest::Method::GET, &url)).await?;
        Ok(list.indexes)
    }

    async fn describe_index(&self) -> Result<IndexDescription> {
        let url = format!("{}/indexes/{}", self.controller_url, self.index_name);
        let result = self
            .send::<IndexDescription>(self.request(reqwest::Method::GET, &url))
            .await;

        match result {
            Err(e)
                if matches!(
                    e.downcast_ref::<VectorDbError>(),
                    Some(VectorDbError::Api { status: 404, .. })
                ) =>
            {
                Err(VectorDbError::IndexNotFound(self.index_name.clone()).into())
            }
            other => other,
        }
    }

    /// Data-plane base URL, from configuration or the control plane
    async fn host(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                if let Some(host) = &self.configured_host {
                    return Ok::<_, anyhow::Error>(host.clone());
                }

                let description = self.describe_index().await?;
                let host = description.host.ok_or_else(|| {
                    VectorDbError::InvalidResponse(format!(
                        "index '{}' has no host yet",
                        description.name
                    ))
                })?;
                tracing::info!("Resolved Pinecone host for '{}': {}", self.index_name, host);
                Ok::<_, anyhow::Error>(normalize_host(&host))
            })
            .await?;
        Ok(host.as_str())
    }

    async fn data_plane<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", self.host().await?, path);
        self.send(self.request(reqwest::Method::POST, &url).json(body))
            .await
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[async_trait::async_trait]
impl VectorDatabase for PineconeVectorDB {
    async fn initialize(&self, dimension: usize) -> Result<()> {
        let indexes = self
            .list_indexes()
            .await
            .context("Failed to list Pinecone indexes")?;

        if let Some(existing) = indexes.iter().find(|i| i.name == self.index_name) {
            if let Some(existing_dim) = existing.dimension
                && existing_dim != dimension
            {
                tracing::warn!(
                    "Index '{}' exists with dimension {}, embeddings have {}",
                    self.index_name,
                    existing_dim,
                    dimension
                );
            }
            tracing::info!("Using existing Pinecone index '{}'", self.index_name);
            return Ok(());
        }

        tracing::info!(
            "Creating Pinecone index '{}' (dimension {}, metric {}, {}/{})",
            self.index_name,
            dimension,
            self.metric,
            self.cloud,
            self.region
        );

        let url = format!("{}/indexes", self.controller_url);
        let body = json!({
            "name": self.index_name,
            "dimension": dimension,
            "metric": self.metric,
            "spec": { "serverless": { "cloud": self.cloud, "region": self.region } },
        });

        self.send::<Value>(self.request(reqwest::Method::POST, &url).json(&body))
            .await
            .map_err(|e| VectorDbError::IndexCreationFailed {
                index: self.index_name.clone(),
                reason: format!("{:#}", e),
            })?;

        Ok(())
    }

    async fn upsert(&self, records: Vec<VectorRecord>, namespace: &str) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let body = json!({ "vectors": records, "namespace": namespace });
        let response: UpsertResponse = self.data_plane("/vectors/upsert", &body).await?;

        tracing::debug!("Upserted {} vectors", response.upserted_count);
        Ok(response.upserted_count)
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        namespace: &str,
        filter: Option<&MetadataFilter>,
        include_metadata: bool,
    ) -> Result<Vec<VectorMatch>> {
        let mut body = json!({
            "vector": vector,
            "topK": top_k,
            "namespace": namespace,
            "includeMetadata": include_metadata,
        });
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            body["filter"] = filter.to_pinecone_filter();
        }

        let response: QueryResponse = self.data_plane("/query", &body).await?;
        Ok(response.matches)
    }

    async fn get_statistics(&self) -> Result<DatabaseStats> {
        let stats: IndexStats = self.data_plane("/describe_index_stats", &json!({})).await?;

        let mut namespaces: Vec<(String, usize)> = stats
            .namespaces
            .into_iter()
            .map(|(name, summary)| (name, summary.vector_count))
            .collect();
        namespaces.sort();

        Ok(DatabaseStats {
            total_vectors: stats.total_vector_count,
            dimension: stats.dimension,
            index_fullness: stats.index_fullness,
            namespaces,
        })
    }

    async fn delete_all(&self, namespace: &str) -> Result<()> {
        let body = json!({ "deleteAll": true, "namespace": namespace });
        self.data_plane::<Value>("/vectors/delete", &body).await?;
        tracing::info!("Deleted all vectors in namespace '{}'", namespace);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "Pinecone"
    }
}
