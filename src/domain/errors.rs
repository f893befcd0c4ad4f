//! Domain errors for the retrieval pipeline.

use thiserror::Error;

/// Configuration errors, raised when a configuration is constructed or loaded.
///
/// These are never silently corrected: an invalid chunking or generation
/// setting fails fast before any pipeline component is built.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid chunk_size: {0}. Must be greater than 0")]
    InvalidChunkSize(usize),

    #[error("Invalid chunk_overlap: {overlap}. Must be less than chunk_size ({chunk_size})")]
    InvalidOverlap { overlap: usize, chunk_size: usize },

    #[error("Invalid max_context_length: {0}. Must be greater than 0")]
    InvalidMaxContextLength(usize),

    #[error("Invalid max_results: {0}. Must be greater than 0")]
    InvalidMaxResults(usize),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Domain-level errors that can occur in the pipeline.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
