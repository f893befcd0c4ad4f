//! `/embeddings` client for OpenAI-compatible servers.
//!
//! Inputs larger than `max_batch_size` are sent as consecutive requests.
//! Every response must carry exactly one vector per input; the vectors are
//! placed by their `index` field, so servers may answer out of order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::EmbeddingBackend;

const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Connection and model settings for [`OpenAiEmbeddingBackend`]
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingConfig {
    /// Bearer token; `OPENAI_API_KEY` is read when unset
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Vector length the model produces
    pub dimension: usize,
    pub timeout_secs: u64,
    /// Inputs per request
    pub max_batch_size: usize,
}

impl Default for OpenAiEmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
            timeout_secs: 30,
            max_batch_size: 2048,
        }
    }
}

impl OpenAiEmbeddingConfig {
    fn resolve_api_key(&self) -> DomainResult<String> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => std::env::var(API_KEY_ENV).map_err(|_| {
                DomainError::EmbeddingFailed(format!(
                    "no API key: set embedding.api_key or {}",
                    API_KEY_ENV
                ))
            }),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url.trim_end_matches('/'))
    }
}

/// Remote embedding backend speaking the OpenAI embeddings protocol
pub struct OpenAiEmbeddingBackend {
    config: OpenAiEmbeddingConfig,
    client: Client,
}

impl OpenAiEmbeddingBackend {
    pub fn new(config: OpenAiEmbeddingConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::EmbeddingFailed(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// One request; vectors come back in input order
    async fn request(&self, input: &[String]) -> DomainResult<Vec<Vec<f32>>> {
        let api_key = self.config.resolve_api_key()?;
        let body = EmbeddingRequest {
            model: &self.config.model,
            input,
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header(header::AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::EmbeddingFailed(format!("embeddings request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::EmbeddingFailed(format!(
                "embeddings endpoint answered {}: {}",
                status, detail
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| DomainError::SerializationError(format!("embeddings response: {}", e)))?;

        tracing::debug!(inputs = input.len(), model = %self.config.model, "Embedded batch");
        order_by_index(parsed.data, input.len())
    }
}

/// Place each item at its `index`; every slot must be filled exactly once
fn order_by_index(items: Vec<EmbeddingItem>, expected: usize) -> DomainResult<Vec<Vec<f32>>> {
    if items.len() != expected {
        return Err(DomainError::EmbeddingFailed(format!(
            "expected {} vectors, got {}",
            expected,
            items.len()
        )));
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in items {
        match slots.get_mut(item.index) {
            Some(slot) if slot.is_none() => *slot = Some(item.embedding),
            _ => {
                return Err(DomainError::EmbeddingFailed(format!(
                    "invalid or repeated response index {}",
                    item.index
                )))
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

#[async_trait]
impl EmbeddingBackend for OpenAiEmbeddingBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> DomainResult<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| DomainError::EmbeddingFailed("empty embeddings response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> DomainResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.max_batch_size()) {
            vectors.extend(self.request(batch).await?);
        }
        Ok(vectors)
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size.max(1)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    index: usize,
}
