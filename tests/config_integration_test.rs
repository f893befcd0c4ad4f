//! Configuration loading feeding pipeline construction

use std::io::Write;
use std::sync::Arc;

use ragline::domain::models::{EmbeddingProviderKind, MetadataEncoding};
use ragline::{ConfigLoader, InMemoryDocumentStore, RagPipeline};
use tempfile::NamedTempFile;

#[test]
fn test_env_selects_provider() {
    temp_env::with_vars(
        [
            ("RAGLINE_EMBEDDING__PROVIDER", Some("mock")),
            ("RAGLINE_EMBEDDING__FALLBACK_DIMENSION", Some("64")),
            ("RAGLINE_STORE__METADATA_ENCODING", Some("native")),
        ],
        || {
            let config = ConfigLoader::load().unwrap();
            assert_eq!(config.embedding.provider, EmbeddingProviderKind::Mock);
            assert_eq!(config.embedding.fallback_dimension, 64);
            assert_eq!(config.store.metadata_encoding, MetadataEncoding::Native);

            let pipeline =
                RagPipeline::from_config(&config, Arc::new(InMemoryDocumentStore::new())).unwrap();
            assert_eq!(pipeline.provider().name(), "mock");
            assert_eq!(pipeline.provider().dimension(), 64);
        },
    );
}

#[test]
fn test_env_invalid_overlap_fails_fast() {
    temp_env::with_vars(
        [
            ("RAGLINE_RAG__CHUNK_SIZE", Some("200")),
            ("RAGLINE_RAG__CHUNK_OVERLAP", Some("200")),
        ],
        || {
            assert!(ConfigLoader::load().is_err());
        },
    );
}

#[test]
fn test_file_config_builds_pipeline() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "rag:\n  chunk_size: 300\n  chunk_overlap: 30\n  max_results: 2\nembedding:\n  provider: statistical\n  max_features: 64\n"
    )
    .unwrap();

    temp_env::with_vars_unset(["RAGLINE_RAG__CHUNK_SIZE", "RAGLINE_EMBEDDING__PROVIDER"], || {
        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        let pipeline =
            RagPipeline::from_config(&config, Arc::new(InMemoryDocumentStore::new())).unwrap();

        assert_eq!(pipeline.config().chunk_size(), 300);
        assert_eq!(pipeline.config().max_results(), 2);
        assert_eq!(pipeline.provider().name(), "tfidf");
        assert!(!pipeline.provider().is_fitted());
    });
}

#[test]
fn test_invalid_log_level_rejected() {
    temp_env::with_var("RAGLINE_LOGGING__LEVEL", Some("chatty"), || {
        let err = ConfigLoader::load().unwrap_err();
        assert!(format!("{:#}", err).contains("chatty"));
    });
}
