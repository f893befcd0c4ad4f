//! Embedding provider with deterministic fallback.
//!
//! Three interchangeable strategies fixed at construction:
//!
//! - **Remote**: an [`EmbeddingBackend`] (e.g. an OpenAI-compatible API),
//!   batched by the backend's `max_batch_size`
//! - **Statistical**: a TF-IDF vectorizer fitted on the most recent batch
//! - **Mock**: hash-seeded vectors, also the fallback for the other two
//!
//! Embedding never fails: whenever the primary strategy cannot produce a
//! vector the hash embedder does, and the result is tagged
//! [`FallbackTier::DeterministicEmbedding`].

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::adapters::embeddings::{OpenAiEmbeddingBackend, OpenAiEmbeddingConfig};
use crate::domain::errors::DomainResult;
use crate::domain::models::{EmbeddingConfig, EmbeddingProviderKind, FallbackTier, Outcome};
use crate::domain::ports::EmbeddingBackend;
use crate::infrastructure::vector::{HashEmbedder, TfIdfVectorizer};

/// Embedding strategy, selected once from configuration
pub enum EmbeddingProvider {
    Remote {
        backend: Arc<dyn EmbeddingBackend>,
        fallback: HashEmbedder,
    },
    Statistical {
        vectorizer: RwLock<Option<TfIdfVectorizer>>,
        max_features: usize,
        fallback: HashEmbedder,
    },
    Mock(HashEmbedder),
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("kind", &self.name())
            .field("dimension", &self.dimension())
            .finish()
    }
}

impl EmbeddingProvider {
    /// Remote provider falling back to hash vectors of `fallback_dimension`
    pub fn remote(backend: Arc<dyn EmbeddingBackend>, fallback_dimension: usize) -> Self {
        Self::Remote {
            backend,
            fallback: HashEmbedder::new(fallback_dimension),
        }
    }

    /// Unfitted TF-IDF provider
    pub fn statistical(max_features: usize, fallback_dimension: usize) -> Self {
        Self::Statistical {
            vectorizer: RwLock::new(None),
            max_features,
            fallback: HashEmbedder::new(fallback_dimension),
        }
    }

    pub fn mock(dimension: usize) -> Self {
        Self::Mock(HashEmbedder::new(dimension))
    }

    /// Build the provider named by `config`
    ///
    /// # Errors
    /// Returns an error if the remote HTTP client cannot be constructed.
    pub fn from_config(config: &EmbeddingConfig) -> DomainResult<Self> {
        let provider = match config.provider {
            EmbeddingProviderKind::Remote => {
                let backend = OpenAiEmbeddingBackend::new(OpenAiEmbeddingConfig {
                    api_key: config.api_key.clone(),
                    base_url: config.base_url.clone(),
                    model: config.model.clone(),
                    dimension: config.dimension,
                    timeout_secs: config.timeout_secs,
                    max_batch_size: config.max_batch_size,
                })?;
                Self::remote(Arc::new(backend), config.fallback_dimension)
            }
            EmbeddingProviderKind::Statistical => {
                Self::statistical(config.max_features, config.fallback_dimension)
            }
            EmbeddingProviderKind::Mock => Self::mock(config.fallback_dimension),
        };

        tracing::info!(provider = provider.name(), "Embedding provider configured");
        Ok(provider)
    }

    /// Provider name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Remote { backend, .. } => backend.name(),
            Self::Statistical { .. } => "tfidf",
            Self::Mock(_) => "mock",
        }
    }

    /// Dimension of primary-tier vectors
    ///
    /// For an unfitted statistical provider this is the fallback dimension.
    pub fn dimension(&self) -> usize {
        match self {
            Self::Remote { backend, .. } => backend.dimension(),
            Self::Statistical {
                vectorizer,
                fallback,
                ..
            } => read_fitted(vectorizer)
                .as_ref()
                .map_or(fallback.dimension(), TfIdfVectorizer::dimension),
            Self::Mock(embedder) => embedder.dimension(),
        }
    }

    /// Whether a statistical provider has been fitted; always true otherwise
    pub fn is_fitted(&self) -> bool {
        match self {
            Self::Statistical { vectorizer, .. } => read_fitted(vectorizer).is_some(),
            _ => true,
        }
    }

    /// Embed a single text
    pub async fn embed_one(&self, text: &str) -> Outcome<Vec<f32>> {
        match self {
            Self::Remote { backend, fallback } => match backend.embed(text).await {
                Ok(vector) => Outcome::Primary(vector),
                Err(e) => {
                    tracing::warn!(backend = backend.name(), error = %e, "Embedding failed, using deterministic fallback");
                    Outcome::degraded(
                        fallback.embed(text),
                        FallbackTier::DeterministicEmbedding,
                        e.to_string(),
                    )
                }
            },
            Self::Statistical {
                vectorizer,
                fallback,
                ..
            } => transform_fitted(vectorizer, fallback, text),
            Self::Mock(embedder) => Outcome::Primary(embedder.embed(text)),
        }
    }

    /// Embed many texts, one outcome per input in input order
    ///
    /// A statistical provider is (re)fitted on `texts` first; the most recent
    /// fit replaces any earlier one.
    pub async fn embed_many(&self, texts: &[String]) -> Vec<Outcome<Vec<f32>>> {
        if texts.is_empty() {
            return Vec::new();
        }

        match self {
            Self::Remote { backend, .. } => self.embed_many_remote(backend.as_ref(), texts).await,
            Self::Statistical {
                vectorizer,
                max_features,
                fallback,
            } => fit_and_transform(vectorizer, *max_features, fallback, texts),
            Self::Mock(embedder) => texts
                .iter()
                .map(|t| Outcome::Primary(embedder.embed(t)))
                .collect(),
        }
    }

    async fn embed_many_remote(
        &self,
        backend: &dyn EmbeddingBackend,
        texts: &[String],
    ) -> Vec<Outcome<Vec<f32>>> {
        let mut outcomes = Vec::with_capacity(texts.len());

        for batch in texts.chunks(backend.max_batch_size().max(1)) {
            match backend.embed_batch(batch).await {
                Ok(vectors) if vectors.len() == batch.len() => {
                    outcomes.extend(vectors.into_iter().map(Outcome::Primary));
                }
                Ok(vectors) => {
                    tracing::warn!(
                        expected = batch.len(),
                        received = vectors.len(),
                        "Embedding batch returned wrong number of vectors, retrying per text"
                    );
                    for text in batch {
                        outcomes.push(self.embed_one(text).await);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        backend = backend.name(),
                        size = batch.len(),
                        error = %e,
                        "Embedding batch failed, retrying per text"
                    );
                    for text in batch {
                        outcomes.push(self.embed_one(text).await);
                    }
                }
            }
        }

        outcomes
    }
}

fn read_fitted(lock: &RwLock<Option<TfIdfVectorizer>>) -> RwLockReadGuard<'_, Option<TfIdfVectorizer>> {
    lock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write_fitted(lock: &RwLock<Option<TfIdfVectorizer>>) -> RwLockWriteGuard<'_, Option<TfIdfVectorizer>> {
    lock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn transform_fitted(
    lock: &RwLock<Option<TfIdfVectorizer>>,
    fallback: &HashEmbedder,
    text: &str,
) -> Outcome<Vec<f32>> {
    let guard = read_fitted(lock);
    match guard.as_ref() {
        Some(vectorizer) if !vectorizer.is_empty() => Outcome::Primary(vectorizer.transform(text)),
        Some(_) => Outcome::degraded(
            fallback.embed(text),
            FallbackTier::DeterministicEmbedding,
            "TF-IDF vocabulary is empty",
        ),
        None => {
            tracing::warn!("TF-IDF vectorizer not fitted, using deterministic fallback");
            Outcome::degraded(
                fallback.embed(text),
                FallbackTier::DeterministicEmbedding,
                "TF-IDF vectorizer has not been fitted",
            )
        }
    }
}

fn fit_and_transform(
    lock: &RwLock<Option<TfIdfVectorizer>>,
    max_features: usize,
    fallback: &HashEmbedder,
    texts: &[String],
) -> Vec<Outcome<Vec<f32>>> {
    let vectorizer = TfIdfVectorizer::fit(texts, max_features);

    let outcomes = if vectorizer.is_empty() {
        tracing::warn!(
            texts = texts.len(),
            "TF-IDF vocabulary is empty, using deterministic fallback"
        );
        texts
            .iter()
            .map(|t| {
                Outcome::degraded(
                    fallback.embed(t),
                    FallbackTier::DeterministicEmbedding,
                    "TF-IDF vocabulary is empty",
                )
            })
            .collect()
    } else {
        texts
            .iter()
            .map(|t| Outcome::Primary(vectorizer.transform(t)))
            .collect()
    };

    *write_fitted(lock) = Some(vectorizer);
    outcomes
}
