//! Document store port.
//!
//! The pipeline persists chunks as tagged documents and reads them back
//! through a filter. Any store with tag filtering and a text-contains
//! match can back the knowledge base.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DocumentFilter, NewDocument, StoredDocument};

/// Repository trait for knowledge-base documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return its store-assigned id
    ///
    /// # Errors
    /// Returns `DomainError::StoreError` if the store rejects the write
    async fn insert(&self, document: NewDocument) -> DomainResult<String>;

    /// Query documents matching the filter
    ///
    /// Every tag in `filter.tags` must be present on a returned document.
    /// When `filter.text` is set, only documents whose title or content
    /// contain it (case-insensitive) are returned. At most `filter.limit`
    /// documents come back, in insertion order.
    async fn query(&self, filter: DocumentFilter) -> DomainResult<Vec<StoredDocument>>;
}
