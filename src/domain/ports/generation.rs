//! Text generation port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Trait for generative completion backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name (e.g., "openai")
    fn name(&self) -> &'static str;

    /// Model identifier reported on generated answers
    fn model(&self) -> &str;

    /// Complete `prompt` at the given sampling temperature
    async fn complete(&self, prompt: &str, temperature: f32) -> DomainResult<String>;
}
