//! Remote generation backends

pub mod openai;

pub use openai::{OpenAiCompletionBackend, OpenAiCompletionConfig};
