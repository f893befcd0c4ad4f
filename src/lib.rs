//! Ragline - retrieval pipeline over a document store
//!
//! Ingests documents by splitting them into overlapping, sentence-aligned
//! chunks, embeds each chunk, and stores the chunks (embeddings included) in
//! a pluggable document store. Questions are answered by ranking stored
//! chunks against the question and composing an answer from the best ones.
//!
//! Every stage degrades instead of failing: embeddings fall back to
//! deterministic vectors, similarity search to lexical search, and
//! generation to sentence extraction. Results carry the tier that produced
//! them as an [`Outcome`].
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and ports
//! - **Adapters** (`adapters`): OpenAI-compatible backends, in-memory store
//! - **Infrastructure Layer** (`infrastructure`): config, logging, vector math
//! - **Service Layer** (`services`): embedding provider, retriever, answerer, pipeline
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ragline::{Config, DocumentInput, InMemoryDocumentStore, RagPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(InMemoryDocumentStore::new());
//!     let pipeline = RagPipeline::from_config(&Config::default(), store)?;
//!     pipeline.ingest(DocumentInput::new("Notes", "Vector search ranks chunks.")).await;
//!     let answer = pipeline.ask("What ranks chunks?").await;
//!     println!("{}", answer.value().answer);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::store::InMemoryDocumentStore;
pub use domain::errors::{ConfigError, DomainError, DomainResult};
pub use domain::models::{
    Answer, AnswerBackend, Chunk, ChunkMetadata, Config, DocumentInput, Fallback, FallbackTier,
    IngestReport, KnowledgeBaseStats, Outcome, RagConfig, Score, ScoredChunk,
};
pub use domain::ports::{DocumentStore, EmbeddingBackend, GenerationBackend};
pub use infrastructure::config::ConfigLoader;
pub use services::{Answerer, EmbeddingProvider, RagPipeline, Retriever};
