pub mod chunking;
pub mod config;
pub mod document;
pub mod outcome;
pub mod retrieval;

pub use chunking::{preview, Chunk, ChunkEnvelope, ChunkMetadata};
pub use config::{
    Config, EmbeddingConfig, EmbeddingProviderKind, GenerationConfig, LoggingConfig,
    MetadataEncoding, RagConfig, RagSettings, StoreConfig,
};
pub use document::{
    DocumentFilter, NewDocument, StoredDocument, CHUNK_TAG, KNOWLEDGE_BASE_TAG,
    METADATA_TAG_PREFIX, SOURCE_TAG_PREFIX,
};
pub use outcome::{Fallback, FallbackTier, Outcome};
pub use retrieval::{
    Answer, AnswerBackend, DocumentInput, IngestReport, KnowledgeBaseStats, Score, ScoredChunk,
    LEXICAL_SENTINEL_SCORE,
};
