//! Mapping between chunks and store documents
//!
//! A chunk is stored as a document under
//! `<kb_path>/<safe_title>/chunk_<NNN>.md`, titled `"<title> - Chunk <n>"`
//! and tagged `knowledge-base`, `chunk` and `source:<source>`. Its metadata
//! (embedding included) travels either as a `metadata:<json>` tag or in the
//! document's native metadata field.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Chunk, ChunkEnvelope, MetadataEncoding, NewDocument, Score, ScoredChunk, StoredDocument,
    CHUNK_TAG, KNOWLEDGE_BASE_TAG, METADATA_TAG_PREFIX, SOURCE_TAG_PREFIX,
};

static UNSAFE_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-_]").expect("path pattern is valid"));

/// Title with every character outside `[A-Za-z0-9_-]` (Unicode word
/// characters included) replaced by `_`
pub fn safe_title(title: &str) -> String {
    UNSAFE_PATH_CHARS.replace_all(title, "_").into_owned()
}

/// Store path of chunk `index` of the document titled `title`
pub fn chunk_path(kb_path: &str, title: &str, index: usize) -> String {
    format!(
        "{}/{}/chunk_{:03}.md",
        kb_path.trim_end_matches('/'),
        safe_title(title),
        index
    )
}

/// Build the store document for `chunk`
///
/// # Errors
/// Returns `DomainError::SerializationError` if the metadata cannot be encoded.
pub fn to_document(
    chunk: &Chunk,
    kb_path: &str,
    encoding: MetadataEncoding,
) -> DomainResult<NewDocument> {
    let meta = &chunk.metadata;
    let envelope = ChunkEnvelope::from(chunk);

    let document = NewDocument::new(
        chunk_path(kb_path, &meta.title, meta.chunk_index),
        format!("{} - Chunk {}", meta.title, meta.chunk_index + 1),
        chunk.content.clone(),
    )
    .with_tag(KNOWLEDGE_BASE_TAG)
    .with_tag(CHUNK_TAG)
    .with_tag(format!("{}{}", SOURCE_TAG_PREFIX, meta.source));

    let document = match encoding {
        MetadataEncoding::Tag => {
            document.with_tag(format!("{}{}", METADATA_TAG_PREFIX, serde_json::to_string(&envelope)?))
        }
        MetadataEncoding::Native => document.with_metadata(serde_json::to_value(&envelope)?),
    };

    Ok(document)
}

/// Decode a stored document's chunk metadata, native field first
///
/// Returns `None` when neither location holds a decodable envelope.
pub fn decode_envelope(document: &StoredDocument) -> Option<ChunkEnvelope> {
    if let Some(value) = &document.metadata {
        if let Ok(envelope) = serde_json::from_value::<ChunkEnvelope>(value.clone()) {
            return Some(envelope);
        }
    }

    let raw = document.tag_value(METADATA_TAG_PREFIX)?;
    match serde_json::from_str::<ChunkEnvelope>(raw) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            tracing::debug!(id = %document.id, error = %e, "Undecodable chunk metadata tag");
            None
        }
    }
}

/// Turn a stored document into a scored chunk
pub fn to_scored(
    document: StoredDocument,
    envelope: Option<ChunkEnvelope>,
    score: Score,
) -> ScoredChunk {
    let (metadata, embedding) = match envelope {
        Some(e) => (Some(e.metadata), e.embedding),
        None => (None, None),
    };

    ScoredChunk {
        id: document.id,
        title: document.title,
        content: document.content,
        tags: document.tags,
        metadata,
        embedding,
        score,
    }
}
