//! Text chunking domain models
//!
//! A chunk is the unit of embedding and retrieval: a bounded, possibly
//! overlapping segment of one source document together with the metadata
//! needed to trace it back to that document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::outcome::Outcome;

/// Metadata attached to every chunk of a document
///
/// Document-level fields (`title`, `source`, `ingested_at`,
/// `content_length`, `extra`) are shared by every chunk of one document.
/// Chunk-level fields are filled in by the chunker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Title of the originating document
    #[serde(default)]
    pub title: String,

    /// Source identifier (e.g. "documentation", a file path)
    #[serde(default = "default_source")]
    pub source: String,

    /// When the originating document was ingested
    pub ingested_at: DateTime<Utc>,

    /// Length of the original, un-normalized content in characters
    #[serde(default)]
    pub content_length: usize,

    /// Index of this chunk within its document (0-based)
    #[serde(default)]
    pub chunk_index: usize,

    /// Total number of chunks produced from the document
    #[serde(default)]
    pub chunk_count: usize,

    /// Start offset (chars) of the chunk window in the normalized text
    #[serde(default)]
    pub start_char: usize,

    /// End offset (chars, exclusive) of the chunk window in the normalized text
    #[serde(default)]
    pub end_char: usize,

    /// Caller-supplied metadata, flattened into the serialized form
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys owned by the pipeline; caller metadata never overrides them
const RESERVED_KEYS: [&str; 10] = [
    "title",
    "source",
    "ingested_at",
    "content_length",
    "chunk_index",
    "chunk_count",
    "start_char",
    "end_char",
    "embedding",
    "embedding_fallback",
];

fn default_source() -> String {
    "unknown".to_string()
}

impl ChunkMetadata {
    /// Create document-level metadata stamped with the current time
    pub fn for_document(
        title: impl Into<String>,
        source: impl Into<String>,
        content_length: usize,
    ) -> Self {
        Self {
            title: title.into(),
            source: source.into(),
            ingested_at: Utc::now(),
            content_length,
            chunk_index: 0,
            chunk_count: 0,
            start_char: 0,
            end_char: 0,
            extra: Map::new(),
        }
    }

    /// Attach caller-supplied metadata, dropping keys the pipeline stamps itself
    pub fn with_extra(mut self, mut extra: Map<String, Value>) -> Self {
        extra.retain(|key, _| !RESERVED_KEYS.contains(&key.as_str()));
        self.extra = extra;
        self
    }

    /// Set the chunk window offsets
    pub fn with_offsets(mut self, start: usize, end: usize) -> Self {
        self.start_char = start;
        self.end_char = end;
        self
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The text content of this chunk (never empty)
    pub content: String,

    /// Metadata about this chunk and its document
    pub metadata: ChunkMetadata,

    /// Embedding vector, `None` until computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// The embedding came from the deterministic fallback tier and is only
    /// comparable with other fallback vectors
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub embedding_fallback: bool,
}

impl Chunk {
    /// Create a new chunk without an embedding
    pub fn new(content: String, metadata: ChunkMetadata) -> Self {
        Self {
            content,
            metadata,
            embedding: None,
            embedding_fallback: false,
        }
    }

    /// Attach an embedding produced by the configured provider
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self.embedding_fallback = false;
        self
    }

    /// Attach an embedding, recording whether a fallback tier produced it
    pub fn with_embedding_outcome(mut self, embedding: Outcome<Vec<f32>>) -> Self {
        self.embedding_fallback = embedding.is_degraded();
        self.embedding = Some(embedding.into_value());
        self
    }

    /// Get a preview of the content (first 100 chars)
    pub fn preview(&self) -> String {
        preview(&self.content, 100)
    }
}

/// Serialized form of a chunk's metadata as persisted alongside a stored
/// document: the chunk metadata with the embedding folded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkEnvelope {
    #[serde(flatten)]
    pub metadata: ChunkMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub embedding_fallback: bool,
}

impl From<&Chunk> for ChunkEnvelope {
    fn from(chunk: &Chunk) -> Self {
        Self {
            metadata: chunk.metadata.clone(),
            embedding: chunk.embedding.clone(),
            embedding_fallback: chunk.embedding_fallback,
        }
    }
}

/// Char-safe preview of `text`, suffixed with "..." when truncated
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
