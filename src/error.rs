/// Centralized error types for pdp-rag using thiserror
///
/// Provides domain-specific error types for better error handling and user-facing messages.
use thiserror::Error;

/// Main error type for the RAG system
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector database error: {0}")]
    VectorDb(#[from] VectorDbError),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Other(String),
}

/// Errors related to the remote embedding API
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding request failed: {0}")]
    RequestFailed(String),

    #[error("Embedding API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode embedding response: {0}")]
    InvalidResponse(String),

    #[error("Embedding count mismatch: sent {expected} texts, got {actual} vectors")]
    CountMismatch { expected: usize, actual: usize },
}

/// Errors related to the managed vector database
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Vector database request failed: {0}")]
    RequestFailed(String),

    #[error("Vector database returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to create index '{index}': {reason}")]
    IndexCreationFailed { index: String, reason: String },

    #[error("Index '{0}' not found")]
    IndexNotFound(String),

    #[error("Failed to decode vector database response: {0}")]
    InvalidResponse(String),

    #[error("Vector store lock was poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors related to the knowledge base artifact
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("Knowledge base not found at '{0}'")]
    NotFound(String),

    #[error("Knowledge base at '{path}' is malformed: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Failed to write knowledge base to '{path}': {reason}")]
    SaveFailed { path: String, reason: String },

    #[error("Failed to extract text from PDF '{path}': {reason}")]
    PdfExtractionFailed { path: String, reason: String },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

/// Errors related to tool input validation
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Empty {0}")]
    Empty(String),
}

// Conversion from anyhow::Error to RagError
impl From<anyhow::Error> for RagError {
    fn from(err: anyhow::Error) -> Self {
        RagError::Other(format!("{:#}", err))
    }
}

impl RagError {
    /// Convert to a user-facing error string suitable for MCP responses
    pub fn to_user_string(&self) -> String {
        format!("{}", self)
    }

    /// Errors the operator or caller can fix; the rest come from upstream services
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RagError::Validation(_) | RagError::Config(_) | RagError::KnowledgeBase(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RagError::Config(ConfigError::MissingRequired("GEMINI_API_KEY".to_string()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required configuration: GEMINI_API_KEY"
        );
    }

    #[test]
    fn test_error_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("test error");
        let rag_err: RagError = anyhow_err.into();
        assert!(matches!(rag_err, RagError::Other(_)));
    }

    #[test]
    fn test_is_user_error() {
        let user_err = RagError::Validation(ValidationError::Empty("keyword".to_string()));
        assert!(user_err.is_user_error());

        let data_err = RagError::KnowledgeBase(KnowledgeBaseError::NotFound("kb.json".into()));
        assert!(data_err.is_user_error());

        let upstream = RagError::VectorDb(VectorDbError::Api {
            status: 503,
            body: "unavailable".to_string(),
        });
        assert!(!upstream.is_user_error());
    }

    #[test]
    fn test_embedding_error_api() {
        let err = EmbeddingError::Api {
            status: 400,
            body: "API key not valid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Embedding API returned 400: API key not valid"
        );
    }

    #[test]
    fn test_embedding_error_count_mismatch() {
        let err = EmbeddingError::CountMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Embedding count mismatch: sent 3 texts, got 2 vectors"
        );
    }

    #[test]
    fn test_vector_db_error_index_creation() {
        let err = VectorDbError::IndexCreationFailed {
            index: "pdp-knowledge".to_string(),
            reason: "quota exceeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to create index 'pdp-knowledge': quota exceeded"
        );
    }

    #[test]
    fn test_knowledge_base_malformed() {
        let err = KnowledgeBaseError::Malformed {
            path: "/tmp/kb.json".to_string(),
            reason: "missing field `pasal`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Knowledge base at '/tmp/kb.json' is malformed: missing field `pasal`"
        );
    }

    #[test]
    fn test_validation_error_empty() {
        let err = RagError::from(ValidationError::Empty("pertanyaan".to_string()));
        assert_eq!(err.to_string(), "Validation error: Empty pertanyaan");
    }

    #[test]
    fn test_user_string_keeps_context_chain() {
        let err: RagError = anyhow::anyhow!("503 Service Unavailable")
            .context("Failed to query index")
            .into();
        assert_eq!(
            err.to_user_string(),
            "Failed to query index: 503 Service Unavailable"
        );
        assert!(!err.is_user_error());
    }
}
