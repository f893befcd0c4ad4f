//! Retrieval and answering domain models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::chunking::ChunkMetadata;
use super::outcome::Fallback;

/// Score reported for hits that came from lexical (non-semantic) matching
pub const LEXICAL_SENTINEL_SCORE: f32 = 0.5;

/// Relevance of a retrieved chunk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// Cosine similarity in [-1, 1]
    Cosine(f32),
    /// Lexical hit; relevance unknown, ordered as the store returned it
    Unranked,
}

impl Score {
    /// Numeric score; unranked hits report [`LEXICAL_SENTINEL_SCORE`]
    pub fn value(&self) -> f32 {
        match self {
            Self::Cosine(s) => *s,
            Self::Unranked => LEXICAL_SENTINEL_SCORE,
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Cosine(_))
    }
}

/// A chunk retrieved from the store together with its relevance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// Store id of the chunk document
    pub id: String,
    /// Title of the chunk document
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Decoded chunk metadata, when the document carried any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChunkMetadata>,
    /// Stored chunk embedding; not part of the serialized result
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    pub score: Score,
}

impl ScoredChunk {
    /// Title of the document this chunk came from
    ///
    /// Falls back to the chunk document's own title for records without
    /// decodable metadata (e.g. lexical hits on foreign documents).
    pub fn source_title(&self) -> &str {
        self.metadata
            .as_ref()
            .map(|m| m.title.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.title)
    }
}

/// Which backend produced an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerBackend {
    Generative { model: String },
    Extractive,
}

/// A composed answer with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// De-duplicated titles of the chunks included in the context
    pub sources: Vec<String>,
    /// The context string actually handed to the backend
    pub context_used: String,
    /// Number of chunks handed to the answerer
    pub context_docs_count: usize,
    pub backend: AnswerBackend,
    /// Set when the context came from a degraded retrieval (e.g. unranked
    /// lexical hits)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_fallback: Option<Fallback>,
}

/// A document submitted for ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl DocumentInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source: None,
            metadata: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Result of ingesting one document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub title: String,
    /// Store ids of the chunks that were stored, in chunk order
    pub chunk_ids: Vec<String>,
    /// Number of chunks the document was split into
    pub total_chunks: usize,
    /// Chunks whose embedding came from the deterministic fallback
    pub degraded_embeddings: usize,
}

impl IngestReport {
    pub fn stored(&self) -> usize {
        self.chunk_ids.len()
    }

    pub fn failed(&self) -> usize {
        self.total_chunks.saturating_sub(self.chunk_ids.len())
    }

    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }
}

/// Aggregate statistics over the knowledge base
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseStats {
    pub total_chunks: usize,
    pub unique_sources: usize,
    /// Distinct sources, sorted
    pub sources: Vec<String>,
    /// Total content length in characters
    pub total_content_length: usize,
    /// Average chunk size in characters (0 for an empty knowledge base)
    pub average_chunk_size: usize,
}
