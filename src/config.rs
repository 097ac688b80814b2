/// Configuration system for pdp-rag
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Config file > Defaults
///
/// API credentials are only ever read from the environment or the config file
/// and are never written back by [`Config::save`].
use crate::error::{ConfigError, RagError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Remote embedding API configuration
    pub embedding: EmbeddingConfig,

    /// Managed vector database configuration
    pub vector_db: VectorDbConfig,

    /// MCP server configuration
    pub server: ServerConfig,

    /// Extraction and ingestion configuration
    pub ingestion: IngestionConfig,
}

/// Embedding API configuration (Gemini)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// API key, mandatory for any embedding call
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier (e.g., "models/text-embedding-004")
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// REST endpoint root
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Output dimension of the model, used when creating the index
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Number of texts per batch request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Inputs longer than this many characters are truncated before submission
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

/// Vector database configuration (Pinecone)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDbConfig {
    /// API key, mandatory for any index operation
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Index name
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Control plane URL used to list, describe and create indexes
    #[serde(default = "default_controller_url")]
    pub controller_url: String,

    /// Data plane host; resolved from the control plane when unset
    #[serde(default)]
    pub index_host: Option<String>,

    /// Namespace used for upserts and queries
    #[serde(default)]
    pub namespace: String,

    /// Similarity metric used at index creation: cosine, euclidean or dotproduct
    #[serde(default = "default_metric")]
    pub metric: String,

    /// Serverless cloud provider
    #[serde(default = "default_cloud")]
    pub cloud: String,

    /// Serverless region
    #[serde(default = "default_region")]
    pub region: String,
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Display name announced to the MCP host
    #[serde(default = "default_server_name")]
    pub name: String,
}

/// Extraction and ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Path of the knowledge base JSON produced by `extract` and read by `ingest`
    #[serde(default = "default_knowledge_base_path")]
    pub knowledge_base_path: PathBuf,

    /// Number of vectors per upsert request
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    /// Title of the source document recorded in the knowledge base metadata
    #[serde(default = "default_source_title")]
    pub source_title: String,
}

const VALID_METRICS: [&str; 3] = ["cosine", "euclidean", "dotproduct"];

/// Upper bound of `batchEmbedContents`
const MAX_EMBEDDING_BATCH: usize = 100;

fn default_model_name() -> String {
    "models/text-embedding-004".to_string()
}

fn default_embedding_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_dimension() -> usize {
    768
}

fn default_batch_size() -> usize {
    100
}

fn default_max_input_chars() -> usize {
    10_000
}

fn default_index_name() -> String {
    "pdp-knowledge".to_string()
}

fn default_controller_url() -> String {
    "https://api.pinecone.io".to_string()
}

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_cloud() -> String {
    "aws".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_server_name() -> String {
    "UU PDP Assistant".to_string()
}

fn default_knowledge_base_path() -> PathBuf {
    crate::paths::PlatformPaths::default_knowledge_base_path()
}

fn default_upsert_batch_size() -> usize {
    100
}

fn default_source_title() -> String {
    "UU Nomor 27 Tahun 2022 tentang Perlindungan Data Pribadi".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_name: default_model_name(),
            base_url: default_embedding_base_url(),
            dimension: default_dimension(),
            batch_size: default_batch_size(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_name: default_index_name(),
            controller_url: default_controller_url(),
            index_host: None,
            namespace: String::new(),
            metric: default_metric(),
            cloud: default_cloud(),
            region: default_region(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            knowledge_base_path: default_knowledge_base_path(),
            upsert_batch_size: default_upsert_batch_size(),
            source_title: default_source_title(),
        }
    }
}

/// Returns the credential if it is present and not blank
pub(crate) fn require_credential(value: Option<&str>, name: &str) -> Result<String, RagError> {
    match value.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(ConfigError::MissingRequired(name.to_string()).into()),
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, RagError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, RagError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file (credentials are omitted)
    pub fn save(&self, path: &Path) -> Result<(), RagError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Write the default configuration to `path`; an existing file is only replaced with `force`
    pub fn write_default(path: &Path, force: bool) -> Result<(), RagError> {
        if path.exists() && !force {
            return Err(ConfigError::SaveFailed(format!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            ))
            .into());
        }

        Self::default().save(path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RagError> {
        if self.embedding.model_name.trim().is_empty() {
            return Err(invalid("embedding.model_name", "must not be empty"));
        }

        if self.embedding.dimension == 0 {
            return Err(invalid("embedding.dimension", "must be greater than 0"));
        }

        if self.embedding.batch_size == 0 || self.embedding.batch_size > MAX_EMBEDDING_BATCH {
            return Err(invalid(
                "embedding.batch_size",
                format!(
                    "must be between 1 and {}, got {}",
                    MAX_EMBEDDING_BATCH, self.embedding.batch_size
                ),
            ));
        }

        if self.embedding.max_input_chars == 0 {
            return Err(invalid("embedding.max_input_chars", "must be greater than 0"));
        }

        if self.vector_db.index_name.trim().is_empty() {
            return Err(invalid("vector_db.index_name", "must not be empty"));
        }

        if !VALID_METRICS.contains(&self.vector_db.metric.as_str()) {
            return Err(invalid(
                "vector_db.metric",
                format!(
                    "must be one of {}, got '{}'",
                    VALID_METRICS.join(", "),
                    self.vector_db.metric
                ),
            ));
        }

        if self.server.name.trim().is_empty() {
            return Err(invalid("server.name", "must not be empty"));
        }

        if self.ingestion.upsert_batch_size == 0 {
            return Err(invalid(
                "ingestion.upsert_batch_size",
                "must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.embedding.api_key = Some(key);
        }

        if let Ok(model) = std::env::var("GEMINI_EMBEDDING_MODEL") {
            self.embedding.model_name = model;
        }

        if let Ok(key) = std::env::var("PINECONE_API_KEY") {
            self.vector_db.api_key = Some(key);
        }

        if let Ok(index) = std::env::var("PINECONE_INDEX_NAME") {
            self.vector_db.index_name = index;
        }

        if let Ok(host) = std::env::var("PINECONE_INDEX_HOST")
            && !host.trim().is_empty()
        {
            self.vector_db.index_host = Some(host);
        }

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            self.server.name = name;
        }

        if let Ok(path) = std::env::var("PDP_RAG_KNOWLEDGE_BASE") {
            self.ingestion.knowledge_base_path = PathBuf::from(path);
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, RagError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Like [`Config::new`], but reads an explicit config file when one is given
    pub fn load(path: Option<&Path>) -> Result<Self, RagError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::load_or_default()?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> RagError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    }
    .into()
}
