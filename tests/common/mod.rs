//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ragline::domain::models::{DocumentFilter, NewDocument, StoreConfig, StoredDocument};
use ragline::{
    DocumentStore, DomainError, DomainResult, EmbeddingProvider, InMemoryDocumentStore,
    RagConfig, RagPipeline,
};

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Pipeline over a fresh in-memory store, extractive answers only
pub fn pipeline(
    config: RagConfig,
    provider: EmbeddingProvider,
) -> (RagPipeline, Arc<InMemoryDocumentStore>) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let pipeline = RagPipeline::new(
        config,
        StoreConfig::default(),
        Arc::new(provider),
        store.clone(),
        None,
    );
    (pipeline, store)
}

/// `len` characters without whitespace or sentence endings
pub fn plain_text(len: usize) -> String {
    "abcdefghij".chars().cycle().take(len).collect()
}

/// Document store that fails every call
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicUsize,
}

impl FailingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _document: NewDocument) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::StoreError("store unavailable".to_string()))
    }

    async fn query(&self, _filter: DocumentFilter) -> DomainResult<Vec<StoredDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::StoreError("store unavailable".to_string()))
    }
}

/// Store that accepts every other insert and delegates queries
pub struct FlakyStore {
    inner: InMemoryDocumentStore,
    inserts: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            inserts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn insert(&self, document: NewDocument) -> DomainResult<String> {
        if self.inserts.fetch_add(1, Ordering::SeqCst) % 2 == 1 {
            return Err(DomainError::StoreError("write rejected".to_string()));
        }
        self.inner.insert(document).await
    }

    async fn query(&self, filter: DocumentFilter) -> DomainResult<Vec<StoredDocument>> {
        self.inner.query(filter).await
    }
}
