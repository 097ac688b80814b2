use super::EmbeddingProvider;
use crate::config::{EmbeddingConfig, require_credential};
use crate::error::{EmbeddingError, RagError};
use crate::knowledge_base::truncate_chars;
use anyhow::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;

const TASK_DOCUMENT: &str = "RETRIEVAL_DOCUMENT";
const TASK_QUERY: &str = "RETRIEVAL_QUERY";

/// Embedding provider backed by the Gemini `embedContent` / `batchEmbedContents` API
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    /// Always carries the `models/` prefix
    model: String,
    dimension: usize,
    batch_size: usize,
    max_input_chars: usize,
}

impl fmt::Debug for GeminiEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiEmbedder")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedContentsResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

impl GeminiEmbedder {
    /// Create an embedder from configuration.
    ///
    /// Fails with `ConfigError::MissingRequired("GEMINI_API_KEY")` when no key is set.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, RagError> {
        let api_key = require_credential(config.api_key.as_deref(), "GEMINI_API_KEY")?;

        let model = if config.model_name.starts_with("models/") {
            config.model_name.clone()
        } else {
            format!("models/{}", config.model_name)
        };

        tracing::info!(
            "Gemini embedder ready: model={}, dimension={}",
            model,
            config.dimension
        );

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model,
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
            max_input_chars: config.max_input_chars,
        })
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request_for(&self, text: &str, task_type: &str) -> Value {
        let count = text.chars().count();
        let text = if count > self.max_input_chars {
            tracing::debug!(
                "Truncating embedding input from {} to {} chars",
                count,
                self.max_input_chars
            );
            truncate_chars(text, self.max_input_chars)
        } else {
            text
        };

        json!({
            "model": self.model,
            "content": { "parts": [{ "text": text }] },
            "taskType": task_type,
        })
    }

    async fn post(&self, method: &str, body: &Value) -> Result<reqwest::Response, EmbeddingError> {
        let url = format!("{}/{}:{}", self.base_url, self.model, method);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| EmbeddingError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn embed_single(&self, text: &str, task_type: &str) -> Result<Vec<f32>> {
        let response = self
            .post("embedContent", &self.request_for(text, task_type))
            .await?;
        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        self.check_dimension(&parsed.embedding.values);
        Ok(parsed.embedding.values)
    }

    async fn embed_group(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let requests: Vec<Value> = texts
            .iter()
            .map(|text| self.request_for(text, TASK_DOCUMENT))
            .collect();

        let response = self
            .post("batchEmbedContents", &json!({ "requests": requests }))
            .await?;
        let parsed: BatchEmbedContentsResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: parsed.embeddings.len(),
            }
            .into());
        }

        Ok(parsed
            .embeddings
            .into_iter()
            .map(|embedding| {
                self.check_dimension(&embedding.values);
                embedding.values
            })
            .collect())
    }

    fn check_dimension(&self, values: &[f32]) {
        if values.len() != self.dimension {
            tracing::warn!(
                "Embedding dimension mismatch: model {} returned {}, configured {}",
                self.model,
                values.len(),
                self.dimension
            );
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_single(text, TASK_DOCUMENT).await
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for (i, group) in texts.chunks(self.batch_size).enumerate() {
            tracing::debug!("Embedding batch {} ({} texts)", i + 1, group.len());
            embeddings.extend(self.embed_group(group).await?);
        }

        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_single(text, TASK_QUERY).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    fn config_for(server: &MockServer) -> EmbeddingConfig {
        EmbeddingConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.uri(),
            dimension: 3,
            batch_size: 2,
            ..EmbeddingConfig::default()
        }
    }

    /// Answers a batch request with one vector per input, `[char count, position, 0]`
    struct EchoLengths;

    impl Respond for EchoLengths {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let embeddings: Vec<Value> = body["requests"]
                .as_array()
                .unwrap()
                .iter()
                .enumerate()
                .map(|(i, req)| {
                    let text = req["content"]["parts"][0]["text"].as_str().unwrap();
                    json!({ "values": [text.chars().count() as f32, i as f32, 0.0] })
                })
                .collect();
            ResponseTemplate::new(200).set_body_json(json!({ "embeddings": embeddings }))
        }
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let config = EmbeddingConfig::default();
        let err = GeminiEmbedder::new(&config).unwrap_err();
        assert!(matches!(
            err,
            RagError::Config(ConfigError::MissingRequired(ref key)) if key == "GEMINI_API_KEY"
        ));
    }

    #[test]
    fn test_model_name_is_prefixed() {
        let config = EmbeddingConfig {
            api_key: Some("k".to_string()),
            model_name: "text-embedding-004".to_string(),
            ..EmbeddingConfig::default()
        };
        let embedder = GeminiEmbedder::new(&config).unwrap();
        assert_eq!(embedder.model_name(), "models/text-embedding-004");
        assert!(!format!("{:?}", embedder).contains("\"k\""));
    }

    #[tokio::test]
    async fn test_embed_document_uses_document_task() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({ "taskType": "RETRIEVAL_DOCUMENT" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embedding": { "values": [0.1, 0.2, 0.3] } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        let vector = embedder.embed_document("Data Pribadi").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_query_uses_query_task() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .and(body_partial_json(json!({ "taskType": "RETRIEVAL_QUERY" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embedding": { "values": [1.0, 0.0, 0.0] } })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        let vector = embedder.embed_query("apa hak saya?").await.unwrap();
        assert_eq!(vector, vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order_and_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:batchEmbedContents"))
            .respond_with(EchoLengths)
            .expect(3)
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        let texts: Vec<String> = ["a", "bb", "ccc", "dddd", "eeeee"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let vectors = embedder.embed_batch(texts).await.unwrap();
        let lengths: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(lengths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[tokio::test]
    async fn test_embed_batch_empty_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(EchoLengths)
            .expect(0)
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        assert!(embedder.embed_batch(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embed_batch_count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:batchEmbedContents"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embeddings": [{ "values": [0.0, 0.0, 0.0] }] })),
            )
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        let err = embedder
            .embed_batch(vec!["satu".to_string(), "dua".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EmbeddingError>(),
            Some(EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        let err = embedder.embed_document("x").await.unwrap_err();
        match err.downcast_ref::<EmbeddingError>() {
            Some(EmbeddingError::Api { status, body }) => {
                assert_eq!(*status, 400);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_long_input_is_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:batchEmbedContents"))
            .respond_with(EchoLengths)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            max_input_chars: 10,
            ..config_for(&server)
        };
        let embedder = GeminiEmbedder::new(&config).unwrap();
        let vectors = embedder.embed_batch(vec!["x".repeat(50)]).await.unwrap();
        assert_eq!(vectors[0][0], 10.0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_not_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "embedding": { "values": [0.5, 0.5] } })),
            )
            .mount(&server)
            .await;

        let embedder = GeminiEmbedder::new(&config_for(&server)).unwrap();
        let vector = embedder.embed_document("x").await.unwrap();
        assert_eq!(vector.len(), 2);
    }
}
