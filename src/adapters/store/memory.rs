//! In-memory document store.
//!
//! Keeps documents in insertion order behind an async `RwLock`. Used by the
//! CLI, the demo and tests; nothing is persisted.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{DocumentFilter, NewDocument, StoredDocument};
use crate::domain::ports::DocumentStore;

/// Document store backed by a `Vec`
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<StoredDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn matches(document: &StoredDocument, filter: &DocumentFilter, needle: Option<&str>) -> bool {
    if !filter.tags.iter().all(|tag| document.has_tag(tag)) {
        return false;
    }
    match needle {
        Some(needle) => {
            document.title.to_lowercase().contains(needle)
                || document.content.to_lowercase().contains(needle)
        }
        None => true,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, document: NewDocument) -> DomainResult<String> {
        let id = Uuid::new_v4().to_string();
        let stored = StoredDocument {
            id: id.clone(),
            path: document.path,
            title: document.title,
            content: document.content,
            tags: document.tags,
            metadata: document.metadata,
        };

        self.documents.write().await.push(stored);
        Ok(id)
    }

    async fn query(&self, filter: DocumentFilter) -> DomainResult<Vec<StoredDocument>> {
        let needle = filter.text.as_deref().map(str::to_lowercase);
        let documents = self.documents.read().await;

        Ok(documents
            .iter()
            .filter(|d| matches(d, &filter, needle.as_deref()))
            .take(filter.limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{CHUNK_TAG, KNOWLEDGE_BASE_TAG};

    async fn seeded() -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        store
            .insert(
                NewDocument::new("/kb/a", "Vector Search", "Similarity over embeddings")
                    .with_tag(KNOWLEDGE_BASE_TAG)
                    .with_tag(CHUNK_TAG),
            )
            .await
            .unwrap();
        store
            .insert(NewDocument::new("/kb/b", "Notes", "Unrelated text").with_tag(KNOWLEDGE_BASE_TAG))
            .await
            .unwrap();
        store
            .insert(NewDocument::new("/other", "Scratch", "vector math").with_tag("draft"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = InMemoryDocumentStore::new();
        let a = store.insert(NewDocument::new("/a", "A", "a")).await.unwrap();
        let b = store.insert(NewDocument::new("/b", "B", "b")).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_tags_are_conjunctive() {
        let store = seeded().await;

        let kb = store.query(DocumentFilter::new(10).tag(KNOWLEDGE_BASE_TAG)).await.unwrap();
        assert_eq!(kb.len(), 2);

        let chunks = store
            .query(DocumentFilter::new(10).tag(KNOWLEDGE_BASE_TAG).tag(CHUNK_TAG))
            .await
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].title, "Vector Search");
    }

    #[tokio::test]
    async fn test_text_match_is_case_insensitive_over_title_and_content() {
        let store = seeded().await;

        let hits = store.query(DocumentFilter::new(10).text("VECTOR")).await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Vector Search", "Scratch"]);

        let scoped = store
            .query(DocumentFilter::new(10).text("vector").tag(KNOWLEDGE_BASE_TAG))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
    }

    #[tokio::test]
    async fn test_limit() {
        let store = seeded().await;
        let hits = store.query(DocumentFilter::new(1)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/kb/a");
    }
}
