use super::*;
use crate::error::ConfigError;
use crate::test_support::{FailingEmbedder, KeywordEmbedder};
use crate::vector_db::InMemoryVectorDB;
use std::sync::atomic::Ordering;

const DOCUMENT: &str = "BAB I\nKETENTUAN UMUM\n\
    Pasal 1\nDalam Undang-Undang ini yang dimaksud dengan:\n\
    1. Data Pribadi adalah data tentang orang perseorangan yang teridentifikasi.\n\
    2. Subjek Data Pribadi adalah orang perseorangan yang pada dirinya melekat Data Pribadi.\n\
    Pasal 2\nUndang-Undang ini berlaku untuk Setiap Orang, Badan Publik, dan Organisasi Internasional.\n\
    BAB IV\nHAK SUBJEK DATA PRIBADI\n\
    Pasal 5\nSubjek Data Pribadi berhak mendapatkan Informasi tentang kejelasan identitas dan hak lainnya.\n";

// Helper to create a test client over in-memory providers
fn create_test_client(upsert_batch_size: usize) -> (RagClient, Arc<KeywordEmbedder>, Arc<InMemoryVectorDB>) {
    let embedder = Arc::new(KeywordEmbedder::default());
    let db = Arc::new(InMemoryVectorDB::new());
    let mut config = Config::default();
    config.ingestion.upsert_batch_size = upsert_batch_size;

    let client = RagClient::with_providers(embedder.clone(), db.clone(), config);
    (client, embedder, db)
}

// ===== Client Initialization Tests =====

#[test]
fn test_with_config_requires_gemini_key() {
    let result = RagClient::with_config(Config::default());
    assert!(matches!(
        result,
        Err(RagError::Config(ConfigError::MissingRequired(ref key))) if key == "GEMINI_API_KEY"
    ));
}

#[test]
fn test_with_config_requires_pinecone_key() {
    let mut config = Config::default();
    config.embedding.api_key = Some("gemini".to_string());

    let result = RagClient::with_config(config);
    assert!(matches!(
        result,
        Err(RagError::Config(ConfigError::MissingRequired(ref key))) if key == "PINECONE_API_KEY"
    ));
}

#[test]
fn test_with_config_succeeds_offline() {
    let mut config = Config::default();
    config.embedding.api_key = Some("gemini".to_string());
    config.vector_db.api_key = Some("pinecone".to_string());

    let client = RagClient::with_config(config).unwrap();
    assert_eq!(client.embedding_dimension(), 768);
    assert_eq!(client.vector_db.backend_name(), "Pinecone");
}

#[test]
fn test_client_clone_shares_retriever() {
    let (client, _, _) = create_test_client(100);
    let cloned = client.clone();
    assert!(Arc::ptr_eq(&client.retriever(), &cloned.retriever()));
    assert_eq!(cloned.config().server.name, "UU PDP Assistant");
}

// ===== Ingestion Tests =====

#[tokio::test]
async fn test_ingest_upserts_every_record() {
    let (client, _, db) = create_test_client(100);
    let kb = KnowledgeBase::from_text(DOCUMENT, "UU PDP");

    let report = client.ingest(&kb, false).await.unwrap();
    assert_eq!(report.pasal, 3);
    assert_eq!(report.definisi, 2);
    assert_eq!(report.vectors_upserted, 5);
    assert_eq!(report.batches, 1);

    let stats = db.get_statistics().await.unwrap();
    assert_eq!(stats.total_vectors, 5);
    assert_eq!(stats.dimension, Some(client.embedding_dimension()));
}

#[tokio::test]
async fn test_ingest_respects_upsert_batch_size() {
    let (client, embedder, _) = create_test_client(2);
    let kb = KnowledgeBase::from_text(DOCUMENT, "UU PDP");

    let report = client.ingest(&kb, false).await.unwrap();
    assert_eq!(report.batches, 3);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_ingest_is_idempotent_and_reset_clears() {
    let (client, _, _) = create_test_client(100);
    let kb = KnowledgeBase::from_text(DOCUMENT, "UU PDP");

    client.ingest(&kb, false).await.unwrap();
    client.ingest(&kb, false).await.unwrap();
    assert_eq!(client.statistics().await.unwrap().total_vectors, 5);

    let empty = KnowledgeBase::from_text("", "kosong");
    client.ingest(&empty, true).await.unwrap();
    assert_eq!(client.statistics().await.unwrap().total_vectors, 0);
}

#[tokio::test]
async fn test_ingest_propagates_embedding_errors() {
    let client = RagClient::with_providers(
        Arc::new(FailingEmbedder),
        Arc::new(InMemoryVectorDB::new()),
        Config::default(),
    );
    let kb = KnowledgeBase::from_text(DOCUMENT, "UU PDP");

    let err = client.ingest(&kb, false).await.unwrap_err();
    assert!(format!("{:#}", err).contains("embedding service unavailable"));
}

// ===== Query Tests =====

#[tokio::test]
async fn test_query_after_ingest() {
    let (client, _, _) = create_test_client(100);
    let kb = KnowledgeBase::from_text(DOCUMENT, "UU PDP");
    client.ingest(&kb, false).await.unwrap();

    let hits = client.query("hak subjek data", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    let pasal5 = hits.iter().find(|h| h.id == "pasal_5").unwrap();
    assert!((pasal5.score - 1.0).abs() < 1e-6);
    assert_eq!(
        pasal5.reference(),
        "BAB IV - HAK SUBJEK DATA PRIBADI, Pasal 5"
    );
}

#[tokio::test]
async fn test_clear_empties_namespace() {
    let (client, _, _) = create_test_client(100);
    let kb = KnowledgeBase::from_text(DOCUMENT, "UU PDP");
    client.ingest(&kb, false).await.unwrap();

    client.clear().await.unwrap();
    assert_eq!(client.statistics().await.unwrap().total_vectors, 0);
}
