//! Embedding backend port for remote vector generation.
//!
//! Local providers (TF-IDF, hash-seeded) live in the infrastructure layer
//! and never fail; this trait covers the fallible, network-backed ones.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Trait for remote embedding backends.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Backend name (e.g., "openai").
    fn name(&self) -> &'static str;

    /// Embedding dimension for this backend/model.
    fn dimension(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>>;

    /// Generate embeddings for multiple texts, one vector per input in input order.
    ///
    /// Implementations split requests larger than [`Self::max_batch_size`].
    async fn embed_batch(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>>;

    /// Maximum number of texts per single API call.
    fn max_batch_size(&self) -> usize;
}
