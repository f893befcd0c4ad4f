//! Similarity retrieval with lexical fallback.
//!
//! Ranks stored chunks by cosine similarity between the query embedding and
//! each chunk's stored embedding. Chunks embedded by the fallback tier are
//! never ranked. When similarity ranking is not possible (degraded query
//! embedding, no comparable candidates, store failure) the store's text
//! match is used instead and every hit is scored [`Score::Unranked`].

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    DocumentFilter, FallbackTier, Outcome, Score, ScoredChunk, CHUNK_TAG, KNOWLEDGE_BASE_TAG,
};
use crate::domain::ports::DocumentStore;
use crate::infrastructure::vector::cosine_similarity;
use crate::services::chunk_records::{decode_envelope, to_scored};
use crate::services::embedding_service::EmbeddingProvider;

/// Default cap on candidate chunks fetched per search
pub const DEFAULT_CANDIDATE_LIMIT: usize = 1000;

/// Ranks knowledge-base chunks against a query
pub struct Retriever {
    provider: Arc<EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    candidate_limit: usize,
}

impl Retriever {
    pub fn new(
        provider: Arc<EmbeddingProvider>,
        store: Arc<dyn DocumentStore>,
        candidate_limit: usize,
    ) -> Self {
        Self {
            provider,
            store,
            candidate_limit,
        }
    }

    /// Return up to `max_results` chunks, most relevant first
    ///
    /// Never fails: every failure path ends in the lexical tier, which in
    /// turn yields an empty result if the store is unavailable.
    pub async fn search(&self, query: &str, max_results: usize) -> Outcome<Vec<ScoredChunk>> {
        if max_results == 0 {
            return Outcome::Primary(Vec::new());
        }

        let reason = match self.provider.embed_one(query).await {
            Outcome::Primary(query_vector) => match self.rank(&query_vector, max_results).await {
                Ok(ranked) if !ranked.is_empty() => {
                    tracing::debug!(query, results = ranked.len(), "Similarity search complete");
                    return Outcome::Primary(ranked);
                }
                Ok(_) => "no candidate chunk has a comparable embedding".to_string(),
                Err(e) => format!("candidate query failed: {}", e),
            },
            Outcome::Degraded { fallback, .. } => {
                format!("query embedding not comparable ({})", fallback)
            }
        };

        tracing::warn!(query, reason = %reason, "Falling back to lexical search");
        self.lexical(query, max_results, reason).await
    }

    async fn rank(&self, query_vector: &[f32], max_results: usize) -> DomainResult<Vec<ScoredChunk>> {
        let filter = DocumentFilter::new(self.candidate_limit)
            .tag(KNOWLEDGE_BASE_TAG)
            .tag(CHUNK_TAG);
        let candidates = self.store.query(filter).await?;
        let total = candidates.len();

        let mut scored: Vec<ScoredChunk> = candidates
            .into_iter()
            .filter_map(|document| {
                let envelope = decode_envelope(&document)?;
                // Fallback vectors share no space with primary query vectors
                if envelope.embedding_fallback {
                    return None;
                }
                let similarity = match envelope.embedding.as_deref() {
                    Some(embedding) if embedding.len() == query_vector.len() => {
                        cosine_similarity(query_vector, embedding)
                    }
                    _ => return None,
                };
                Some(to_scored(document, Some(envelope), Score::Cosine(similarity)))
            })
            .collect();

        tracing::debug!(candidates = total, comparable = scored.len(), "Scored candidates");

        // Stable: equal scores keep store order
        scored.sort_by(|a, b| b.score.value().total_cmp(&a.score.value()));
        scored.truncate(max_results);
        Ok(scored)
    }

    async fn lexical(&self, query: &str, max_results: usize, reason: String) -> Outcome<Vec<ScoredChunk>> {
        let filter = DocumentFilter::new(max_results)
            .tag(KNOWLEDGE_BASE_TAG)
            .text(query);

        match self.store.query(filter).await {
            Ok(documents) => {
                let hits = documents
                    .into_iter()
                    .map(|document| {
                        let envelope = decode_envelope(&document);
                        to_scored(document, envelope, Score::Unranked)
                    })
                    .collect();
                Outcome::degraded(hits, FallbackTier::LexicalSearch, reason)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Lexical search failed");
                Outcome::degraded(
                    Vec::new(),
                    FallbackTier::LexicalSearch,
                    format!("{}; lexical search failed: {}", reason, e),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryDocumentStore;
    use crate::domain::models::{Chunk, ChunkMetadata, MetadataEncoding, NewDocument};
    use crate::services::chunk_records::to_document;

    async fn store_chunk(store: &InMemoryDocumentStore, title: &str, content: &str, embedding: Vec<f32>) {
        let chunk = Chunk::new(
            content.to_string(),
            ChunkMetadata::for_document(title, "tests", content.len()),
        )
        .with_embedding(embedding);
        let document = to_document(&chunk, "/knowledge", MetadataEncoding::Tag).unwrap();
        store.insert(document).await.unwrap();
    }

    fn retriever(store: Arc<InMemoryDocumentStore>, provider: EmbeddingProvider) -> Retriever {
        Retriever::new(Arc::new(provider), store, DEFAULT_CANDIDATE_LIMIT)
    }

    #[tokio::test]
    async fn test_ranks_by_cosine_similarity() {
        let provider = EmbeddingProvider::mock(4);
        let query_vector = provider.embed_one("query").await.into_value();
        let opposite: Vec<f32> = query_vector.iter().map(|x| -x).collect();

        let store = Arc::new(InMemoryDocumentStore::new());
        store_chunk(&store, "Opposite", "far", opposite).await;
        store_chunk(&store, "Same", "near", query_vector.clone()).await;

        let outcome = retriever(store, provider).search("query", 5).await;

        assert!(!outcome.is_degraded());
        let results = outcome.into_value();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source_title(), "Same");
        assert!((results[0].score.value() - 1.0).abs() < 1e-5);
        assert!((results[1].score.value() + 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_truncates_to_max_results() {
        let provider = EmbeddingProvider::mock(4);
        let v = provider.embed_one("query").await.into_value();
        let store = Arc::new(InMemoryDocumentStore::new());
        for i in 0..4 {
            store_chunk(&store, &format!("Doc {}", i), "text", v.clone()).await;
        }

        let results = retriever(store, provider).search("query", 2).await.into_value();

        assert_eq!(results.len(), 2);
        // Equal scores keep insertion order
        assert_eq!(results[0].source_title(), "Doc 0");
        assert_eq!(results[1].source_title(), "Doc 1");
    }

    #[tokio::test]
    async fn test_skips_dimension_mismatch() {
        let provider = EmbeddingProvider::mock(4);
        let v = provider.embed_one("query").await.into_value();
        let store = Arc::new(InMemoryDocumentStore::new());
        store_chunk(&store, "Wrong", "text", vec![1.0, 0.0]).await;
        store_chunk(&store, "Right", "text", v).await;

        let results = retriever(store, provider).search("query", 5).await.into_value();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_title(), "Right");
    }

    #[tokio::test]
    async fn test_skips_fallback_embeddings() {
        let provider = EmbeddingProvider::mock(4);
        let v = provider.embed_one("query").await.into_value();
        let store = Arc::new(InMemoryDocumentStore::new());
        let chunk = Chunk::new(
            "query text".to_string(),
            ChunkMetadata::for_document("Hashed", "tests", 10),
        )
        .with_embedding_outcome(Outcome::degraded(
            v,
            FallbackTier::DeterministicEmbedding,
            "backend offline",
        ));
        store
            .insert(to_document(&chunk, "/knowledge", MetadataEncoding::Tag).unwrap())
            .await
            .unwrap();

        let outcome = retriever(store, provider).search("query", 5).await;

        assert_eq!(outcome.tier(), Some(FallbackTier::LexicalSearch));
        assert_eq!(outcome.value().len(), 1);
        assert_eq!(outcome.value()[0].score, Score::Unranked);
    }

    #[tokio::test]
    async fn test_no_comparable_candidates_goes_lexical() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store
            .insert(
                NewDocument::new("/kb/plain", "Plain note", "mentions the query term")
                    .with_tag(KNOWLEDGE_BASE_TAG),
            )
            .await
            .unwrap();

        let outcome = retriever(store, EmbeddingProvider::mock(4)).search("query", 5).await;

        assert_eq!(outcome.tier(), Some(FallbackTier::LexicalSearch));
        let results = outcome.into_value();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, Score::Unranked);
        assert_eq!(results[0].source_title(), "Plain note");
    }

    #[tokio::test]
    async fn test_unfitted_statistical_query_goes_lexical() {
        let store = Arc::new(InMemoryDocumentStore::new());
        store_chunk(&store, "Doc", "vector search text", vec![1.0; 8]).await;

        let outcome = retriever(store, EmbeddingProvider::statistical(512, 8))
            .search("vector", 5)
            .await;

        assert_eq!(outcome.tier(), Some(FallbackTier::LexicalSearch));
        assert_eq!(outcome.value().len(), 1);
        assert!((outcome.value()[0].score.value() - 0.5).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_degraded() {
        let outcome = retriever(Arc::new(InMemoryDocumentStore::new()), EmbeddingProvider::mock(4))
            .search("anything", 5)
            .await;

        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }
}
