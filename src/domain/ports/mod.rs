//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces the services depend on and adapters implement:
//! - DocumentStore: persistence and querying of knowledge-base documents
//! - EmbeddingBackend: remote text-to-vector providers
//! - GenerationBackend: remote text completion providers

pub mod document_store;
pub mod embedding;
pub mod generation;

pub use document_store::DocumentStore;
pub use embedding::EmbeddingBackend;
pub use generation::GenerationBackend;
