//! Service layer: the retrieval pipeline and its stages

pub mod answerer;
pub mod chunk_records;
pub mod embedding_service;
pub mod rag_service;
pub mod retriever;

pub use answerer::Answerer;
pub use embedding_service::EmbeddingProvider;
pub use rag_service::RagPipeline;
pub use retriever::Retriever;
