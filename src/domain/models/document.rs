//! Document store records
//!
//! The pipeline talks to its backing store only in terms of these records:
//! a document to insert, a stored document handed back by a query, and the
//! query filter itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag marking every document that belongs to the knowledge base
pub const KNOWLEDGE_BASE_TAG: &str = "knowledge-base";

/// Tag marking chunk documents
pub const CHUNK_TAG: &str = "chunk";

/// Prefix of the tag carrying the originating source
pub const SOURCE_TAG_PREFIX: &str = "source:";

/// Prefix of the tag carrying serialized chunk metadata
pub const METADATA_TAG_PREFIX: &str = "metadata:";

/// A document to insert into the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub path: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Native metadata field, for stores that support one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl NewDocument {
    pub fn new(path: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            metadata: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A document returned by a store query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub path: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl StoredDocument {
    /// Returns true if the document carries `tag` exactly
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Value of the first tag starting with `prefix`, with the prefix removed
    pub fn tag_value(&self, prefix: &str) -> Option<&str> {
        self.tags.iter().find_map(|t| t.strip_prefix(prefix))
    }
}

/// Query filter: conjunctive tags, optional text match, result limit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentFilter {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub limit: usize,
}

impl DocumentFilter {
    pub fn new(limit: usize) -> Self {
        Self {
            tags: Vec::new(),
            text: None,
            limit,
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}
