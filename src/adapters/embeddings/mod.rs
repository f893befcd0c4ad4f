//! Remote embedding backends

pub mod openai;

pub use openai::{OpenAiEmbeddingBackend, OpenAiEmbeddingConfig};
