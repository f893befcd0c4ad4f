//! RAG (Retrieval-Augmented Generation) pipeline
//!
//! High-level orchestration over the chunker, the embedding provider, the
//! retriever and the answerer. Every operation except `stats` is total: the
//! degraded tiers of each stage are reported through [`Outcome`] rather
//! than errors.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::adapters::generation::{OpenAiCompletionBackend, OpenAiCompletionConfig};
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Answer, Chunk, ChunkMetadata, Config, DocumentFilter, DocumentInput, IngestReport,
    KnowledgeBaseStats, Outcome, RagConfig, ScoredChunk, StoreConfig, KNOWLEDGE_BASE_TAG,
    SOURCE_TAG_PREFIX,
};
use crate::domain::ports::{DocumentStore, GenerationBackend};
use crate::infrastructure::vector::Chunker;
use crate::services::answerer::Answerer;
use crate::services::chunk_records::to_document;
use crate::services::embedding_service::EmbeddingProvider;
use crate::services::retriever::Retriever;

const UNKNOWN_SOURCE: &str = "unknown";

/// Ingestion, retrieval and answering over one document store
///
/// This pipeline provides:
/// - Document ingestion with chunking, embedding and per-chunk storage
/// - Similarity search with lexical fallback
/// - Answer composition with extractive fallback
/// - Knowledge base statistics
pub struct RagPipeline {
    config: RagConfig,
    store_config: StoreConfig,
    chunker: Chunker,
    provider: Arc<EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    retriever: Retriever,
    answerer: Answerer,
}

impl RagPipeline {
    /// Create a pipeline from its parts
    ///
    /// # Arguments
    /// * `config` - Validated chunking/context/generation parameters
    /// * `store_config` - Store path prefix, candidate cap, metadata encoding
    /// * `provider` - Embedding provider used for chunks and queries
    /// * `store` - Document store holding the knowledge base
    /// * `generator` - Optional generative backend; `None` means extractive answers
    pub fn new(
        config: RagConfig,
        store_config: StoreConfig,
        provider: Arc<EmbeddingProvider>,
        store: Arc<dyn DocumentStore>,
        generator: Option<Arc<dyn GenerationBackend>>,
    ) -> Self {
        let retriever = Retriever::new(
            Arc::clone(&provider),
            Arc::clone(&store),
            store_config.candidate_limit,
        );
        let answerer = Answerer::new(&config, generator);

        Self {
            config,
            store_config,
            chunker: Chunker::new(&config),
            provider,
            store,
            retriever,
            answerer,
        }
    }

    /// Build a pipeline from loaded configuration
    ///
    /// The generative backend is only constructed when `generation.enabled`.
    pub fn from_config(config: &Config, store: Arc<dyn DocumentStore>) -> DomainResult<Self> {
        let provider = Arc::new(EmbeddingProvider::from_config(&config.embedding)?);

        let generator: Option<Arc<dyn GenerationBackend>> = if config.generation.enabled {
            let backend = OpenAiCompletionBackend::new(OpenAiCompletionConfig {
                api_key: config.generation.api_key.clone(),
                base_url: config.generation.base_url.clone(),
                model: config.generation.model.clone(),
                timeout_secs: config.generation.timeout_secs,
                max_tokens: config.generation.max_tokens,
            })?;
            Some(Arc::new(backend))
        } else {
            None
        };

        Ok(Self::new(
            config.rag,
            config.store.clone(),
            provider,
            store,
            generator,
        ))
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn provider(&self) -> &EmbeddingProvider {
        &self.provider
    }

    /// Chunk, embed and store one document
    ///
    /// Chunks are embedded one at a time. Chunks the store rejects are
    /// logged and skipped; the report lists the ones that were stored.
    pub async fn ingest(&self, document: DocumentInput) -> IngestReport {
        let (title, chunks) = self.prepare(document);

        let mut embeddings = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            embeddings.push(self.provider.embed_one(&chunk.content).await);
        }

        self.store_chunks(&title, chunks, embeddings).await
    }

    /// Ingest several documents with a single batched embedding pass
    ///
    /// For the statistical provider this fits one vocabulary over every
    /// chunk of every document.
    pub async fn ingest_batch(&self, documents: Vec<DocumentInput>) -> Vec<IngestReport> {
        let prepared: Vec<(String, Vec<Chunk>)> =
            documents.into_iter().map(|d| self.prepare(d)).collect();

        let texts: Vec<String> = prepared
            .iter()
            .flat_map(|(_, chunks)| chunks.iter().map(|c| c.content.clone()))
            .collect();
        let mut embeddings = self.provider.embed_many(&texts).await.into_iter();

        let mut reports = Vec::with_capacity(prepared.len());
        for (title, chunks) in prepared {
            let document_embeddings: Vec<Outcome<Vec<f32>>> =
                embeddings.by_ref().take(chunks.len()).collect();
            reports.push(self.store_chunks(&title, chunks, document_embeddings).await);
        }

        tracing::info!(
            documents = reports.len(),
            chunks = texts.len(),
            "Batch ingestion complete"
        );
        reports
    }

    /// Rank knowledge-base chunks against `query`
    ///
    /// `max_results` defaults to the configured value.
    pub async fn search(&self, query: &str, max_results: Option<usize>) -> Outcome<Vec<ScoredChunk>> {
        let limit = max_results.unwrap_or(self.config.max_results());
        self.retriever.search(query, limit).await
    }

    /// Answer `question` from caller-provided context chunks
    pub async fn answer(&self, question: &str, context: &[ScoredChunk]) -> Outcome<Answer> {
        self.answerer.answer(question, context).await
    }

    /// Search, then answer from the results
    ///
    /// A degraded retrieval is recorded on the answer as
    /// `retrieval_fallback`. It also marks the result degraded when the
    /// answer itself came from the generative backend; otherwise the
    /// outcome carries the answer's own fallback.
    pub async fn ask(&self, question: &str) -> Outcome<Answer> {
        let (chunks, retrieval_fallback) = self.search(question, None).await.into_parts();
        let answer = self.answer(question, &chunks).await.map(|mut answer| {
            answer.retrieval_fallback = retrieval_fallback.clone();
            answer
        });

        match (answer, retrieval_fallback) {
            (Outcome::Primary(value), Some(fallback)) => Outcome::Degraded { value, fallback },
            (answer, _) => answer,
        }
    }

    /// Aggregate statistics over knowledge-base documents
    pub async fn stats(&self) -> DomainResult<KnowledgeBaseStats> {
        let filter = DocumentFilter::new(self.store_config.candidate_limit).tag(KNOWLEDGE_BASE_TAG);
        let documents = self.store.query(filter).await?;

        let sources: BTreeSet<&str> = documents
            .iter()
            .filter_map(|d| d.tag_value(SOURCE_TAG_PREFIX))
            .collect();
        let total_content_length: usize = documents.iter().map(|d| d.content.chars().count()).sum();
        let total_chunks = documents.len();

        Ok(KnowledgeBaseStats {
            total_chunks,
            unique_sources: sources.len(),
            sources: sources.into_iter().map(str::to_string).collect(),
            total_content_length,
            average_chunk_size: total_content_length.checked_div(total_chunks).unwrap_or(0),
        })
    }

    /// Stamp document-level metadata and chunk the content
    fn prepare(&self, document: DocumentInput) -> (String, Vec<Chunk>) {
        let source = document
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        let metadata = ChunkMetadata::for_document(
            document.title.clone(),
            source,
            document.content.chars().count(),
        )
        .with_extra(document.metadata);

        let chunks = self.chunker.chunk(&document.content, &metadata);
        tracing::debug!(title = %document.title, chunks = chunks.len(), "Prepared document");
        (document.title, chunks)
    }

    async fn store_chunks(
        &self,
        title: &str,
        chunks: Vec<Chunk>,
        embeddings: Vec<Outcome<Vec<f32>>>,
    ) -> IngestReport {
        let total = chunks.len();
        let mut report = IngestReport {
            title: title.to_string(),
            total_chunks: total,
            ..IngestReport::default()
        };

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.is_degraded() {
                report.degraded_embeddings += 1;
            }
            let chunk = chunk.with_embedding_outcome(embedding);
            let index = chunk.metadata.chunk_index;

            let stored = match to_document(
                &chunk,
                &self.store_config.knowledge_base_path,
                self.store_config.metadata_encoding,
            ) {
                Ok(document) => self.store.insert(document).await,
                Err(e) => Err(e),
            };

            match stored {
                Ok(id) => report.chunk_ids.push(id),
                Err(e) => tracing::warn!(title, chunk = index, error = %e, "Failed to store chunk"),
            }
        }

        tracing::info!(
            title,
            degraded_embeddings = report.degraded_embeddings,
            "{} of {} chunks stored",
            report.stored(),
            total
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryDocumentStore;
    use crate::domain::models::{FallbackTier, MetadataEncoding};
    use serde_json::json;

    fn pipeline_with(
        provider: EmbeddingProvider,
        store: Arc<InMemoryDocumentStore>,
        encoding: MetadataEncoding,
    ) -> RagPipeline {
        let store_config = StoreConfig {
            metadata_encoding: encoding,
            ..StoreConfig::default()
        };
        RagPipeline::new(RagConfig::default(), store_config, Arc::new(provider), store, None)
    }

    #[tokio::test]
    async fn test_ingest_stores_every_chunk() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = pipeline_with(EmbeddingProvider::mock(16), store.clone(), MetadataEncoding::Tag);

        let report = pipeline
            .ingest(DocumentInput::new("Long Doc", "word ".repeat(500)).with_source("docs"))
            .await;

        assert_eq!(report.total_chunks, 3);
        assert_eq!(report.stored(), 3);
        assert!(report.is_complete());
        assert_eq!(report.degraded_embeddings, 0);
        assert_eq!(store.len().await, 3);
    }

    #[tokio::test]
    async fn test_ingest_defaults_source_and_keeps_extra_metadata() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = pipeline_with(EmbeddingProvider::mock(16), store.clone(), MetadataEncoding::Native);

        pipeline
            .ingest(DocumentInput::new("Note", "Short note.").with_metadata("lang", json!("en")))
            .await;

        let results = pipeline.search("Short note.", Some(1)).await.into_value();
        let metadata = results[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.source, "unknown");
        assert_eq!(metadata.extra.get("lang"), Some(&json!("en")));
        assert_eq!(metadata.content_length, 11);
        assert!(results[0].tags.contains(&"source:unknown".to_string()));
    }

    #[tokio::test]
    async fn test_mock_exact_text_ranks_first() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = pipeline_with(EmbeddingProvider::mock(64), store, MetadataEncoding::Tag);
        pipeline.ingest(DocumentInput::new("A", "Alpha document text.")).await;
        pipeline.ingest(DocumentInput::new("B", "Beta document text.")).await;

        let outcome = pipeline.search("Beta document text.", None).await;

        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value()[0].source_title(), "B");
        assert!((outcome.value()[0].score.value() - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_stats() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = pipeline_with(EmbeddingProvider::mock(8), store, MetadataEncoding::Tag);

        let empty = pipeline.stats().await.unwrap();
        assert_eq!(empty, KnowledgeBaseStats::default());

        pipeline.ingest(DocumentInput::new("One", "12345").with_source("b-src")).await;
        pipeline.ingest(DocumentInput::new("Two", "1234567").with_source("a-src")).await;
        pipeline.ingest(DocumentInput::new("Three", "123").with_source("a-src")).await;

        let stats = pipeline.stats().await.unwrap();
        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.unique_sources, 2);
        assert_eq!(stats.sources, vec!["a-src", "b-src"]);
        assert_eq!(stats.total_content_length, 15);
        assert_eq!(stats.average_chunk_size, 5);
    }

    #[tokio::test]
    async fn test_ask_without_generator_is_extractive() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let pipeline = pipeline_with(EmbeddingProvider::mock(8), store, MetadataEncoding::Tag);
        pipeline
            .ingest(DocumentInput::new("Facts", "The sky appears blue during the day."))
            .await;

        let outcome = pipeline.ask("The sky appears blue during the day.").await;

        assert_eq!(outcome.tier(), Some(FallbackTier::ExtractiveAnswer));
        assert_eq!(
            outcome.value().answer,
            "Based on the knowledge base: From 'Facts':\nThe sky appears blue during the day"
        );
        assert_eq!(outcome.value().sources, vec!["Facts"]);
    }
}
