use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;

/// Main configuration structure for ragline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Chunking, context and generation parameters
    #[serde(default)]
    pub rag: RagConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Generative backend configuration
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Document store conventions
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Immutable pipeline parameters
///
/// Fields are private: the only ways to obtain a `RagConfig` are
/// [`RagConfig::new`], `TryFrom<RagSettings>` and deserialization, all of
/// which validate. An invalid combination (e.g. `chunk_overlap >= chunk_size`)
/// is rejected here and never reaches the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RagSettings", into = "RagSettings")]
pub struct RagConfig {
    chunk_size: usize,
    chunk_overlap: usize,
    max_context_length: usize,
    max_results: usize,
    temperature: f32,
}

impl RagConfig {
    /// Build a validated configuration
    pub fn new(
        chunk_size: usize,
        chunk_overlap: usize,
        max_context_length: usize,
        max_results: usize,
        temperature: f32,
    ) -> Result<Self, ConfigError> {
        RagSettings {
            chunk_size,
            chunk_overlap,
            max_context_length,
            max_results,
            temperature,
        }
        .try_into()
    }

    /// Default configuration with different chunking parameters
    pub fn with_chunking(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ConfigError> {
        RagSettings {
            chunk_size,
            chunk_overlap,
            ..RagSettings::default()
        }
        .try_into()
    }

    /// Window size in characters
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared by consecutive chunks
    pub const fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Maximum length of the context handed to the answerer, in characters
    pub const fn max_context_length(&self) -> usize {
        self.max_context_length
    }

    /// Default number of results returned by a search
    pub const fn max_results(&self) -> usize {
        self.max_results
    }

    /// Generation randomness
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        let s = RagSettings::default();
        Self {
            chunk_size: s.chunk_size,
            chunk_overlap: s.chunk_overlap,
            max_context_length: s.max_context_length,
            max_results: s.max_results,
            temperature: s.temperature,
        }
    }
}

/// Unvalidated, serializable form of [`RagConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RagSettings {
    /// Chunk size in characters (> 0)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap in characters (< chunk_size)
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Maximum context length in characters (> 0)
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,

    /// Maximum retrieved results (> 0)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Generation temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

const fn default_chunk_size() -> usize {
    1000
}

const fn default_chunk_overlap() -> usize {
    100
}

const fn default_max_context_length() -> usize {
    4000
}

const fn default_max_results() -> usize {
    5
}

const fn default_temperature() -> f32 {
    0.7
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_context_length: default_max_context_length(),
            max_results: default_max_results(),
            temperature: default_temperature(),
        }
    }
}

impl TryFrom<RagSettings> for RagConfig {
    type Error = ConfigError;

    fn try_from(s: RagSettings) -> Result<Self, Self::Error> {
        if s.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(s.chunk_size));
        }

        if s.chunk_overlap >= s.chunk_size {
            return Err(ConfigError::InvalidOverlap {
                overlap: s.chunk_overlap,
                chunk_size: s.chunk_size,
            });
        }

        if s.max_context_length == 0 {
            return Err(ConfigError::InvalidMaxContextLength(s.max_context_length));
        }

        if s.max_results == 0 {
            return Err(ConfigError::InvalidMaxResults(s.max_results));
        }

        if !(0.0..=2.0).contains(&s.temperature) {
            return Err(ConfigError::InvalidTemperature(s.temperature));
        }

        Ok(Self {
            chunk_size: s.chunk_size,
            chunk_overlap: s.chunk_overlap,
            max_context_length: s.max_context_length,
            max_results: s.max_results,
            temperature: s.temperature,
        })
    }
}

impl From<RagConfig> for RagSettings {
    fn from(c: RagConfig) -> Self {
        Self {
            chunk_size: c.chunk_size,
            chunk_overlap: c.chunk_overlap,
            max_context_length: c.max_context_length,
            max_results: c.max_results,
            temperature: c.temperature,
        }
    }
}

/// Which embedding strategy a provider uses for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderKind {
    /// External embedding API (OpenAI-compatible)
    Remote,
    /// Local TF-IDF vectorizer fitted per batch
    #[default]
    Statistical,
    /// Deterministic hash-seeded vectors
    Mock,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Provider strategy
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// Remote embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Remote API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// API key (falls back to `OPENAI_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Expected dimension of remote embeddings
    #[serde(default = "default_remote_dimension")]
    pub dimension: usize,

    /// Dimension of deterministic (mock and fallback) vectors
    #[serde(default = "default_fallback_dimension")]
    pub fallback_dimension: usize,

    /// Remote request timeout in seconds
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum texts per remote batch request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Vocabulary cap of the TF-IDF vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_remote_dimension() -> usize {
    1536
}

const fn default_fallback_dimension() -> usize {
    384
}

const fn default_embedding_timeout_secs() -> u64 {
    30
}

const fn default_max_batch_size() -> usize {
    2048
}

const fn default_max_features() -> usize {
    512
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_embedding_model(),
            base_url: default_openai_base_url(),
            api_key: None,
            dimension: default_remote_dimension(),
            fallback_dimension: default_fallback_dimension(),
            timeout_secs: default_embedding_timeout_secs(),
            max_batch_size: default_max_batch_size(),
            max_features: default_max_features(),
        }
    }
}

/// Generative backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Whether to call a generative backend at all
    #[serde(default)]
    pub enabled: bool,

    /// Chat completion model
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// API key (falls back to `OPENAI_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_completion_model() -> String {
    "gpt-3.5-turbo".to_string()
}

const fn default_generation_timeout_secs() -> u64 {
    60
}

const fn default_max_tokens() -> u32 {
    500
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_completion_model(),
            base_url: default_openai_base_url(),
            api_key: None,
            timeout_secs: default_generation_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// How chunk metadata (including the embedding) travels with a stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataEncoding {
    /// Serialized into a `metadata:<json>` tag
    #[default]
    Tag,
    /// Stored in the document's native metadata field
    Native,
}

/// Document store conventions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Path prefix under which chunk documents are stored
    #[serde(default = "default_knowledge_base_path")]
    pub knowledge_base_path: String,

    /// Cap on candidates fetched for similarity ranking
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,

    /// Chunk metadata encoding
    #[serde(default)]
    pub metadata_encoding: MetadataEncoding,
}

fn default_knowledge_base_path() -> String {
    "/knowledge".to_string()
}

const fn default_candidate_limit() -> usize {
    1000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            knowledge_base_path: default_knowledge_base_path(),
            candidate_limit: default_candidate_limit(),
            metadata_encoding: MetadataEncoding::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rag_config_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.chunk_size(), 1000);
        assert_eq!(config.chunk_overlap(), 100);
        assert_eq!(config.max_context_length(), 4000);
        assert_eq!(config.max_results(), 5);
        assert!((config.temperature() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rag_config_rejects_overlap_not_less_than_size() {
        assert_eq!(
            RagConfig::with_chunking(100, 100),
            Err(ConfigError::InvalidOverlap {
                overlap: 100,
                chunk_size: 100
            })
        );
        assert!(RagConfig::with_chunking(100, 150).is_err());
        assert!(RagConfig::with_chunking(100, 99).is_ok());
    }

    #[test]
    fn test_rag_config_rejects_zero_values() {
        assert_eq!(
            RagConfig::with_chunking(0, 0),
            Err(ConfigError::InvalidChunkSize(0))
        );
        assert_eq!(
            RagConfig::new(100, 10, 0, 5, 0.7),
            Err(ConfigError::InvalidMaxContextLength(0))
        );
        assert_eq!(
            RagConfig::new(100, 10, 100, 0, 0.7),
            Err(ConfigError::InvalidMaxResults(0))
        );
    }

    #[test]
    fn test_rag_config_rejects_temperature_out_of_range() {
        assert!(RagConfig::new(100, 10, 100, 5, 2.5).is_err());
        assert!(RagConfig::new(100, 10, 100, 5, -0.1).is_err());
        assert!(RagConfig::new(100, 10, 100, 5, f32::NAN).is_err());
        assert!(RagConfig::new(100, 10, 100, 5, 2.0).is_ok());
        assert!(RagConfig::new(100, 10, 100, 5, 0.0).is_ok());
    }

    #[test]
    fn test_rag_config_deserialization_validates() {
        let ok: RagConfig = serde_yaml::from_str("chunk_size: 200\nchunk_overlap: 20\n").unwrap();
        assert_eq!(ok.chunk_size(), 200);
        assert_eq!(ok.max_results(), 5);

        let bad = serde_yaml::from_str::<RagConfig>("chunk_size: 200\nchunk_overlap: 200\n");
        assert!(bad.is_err());
    }

    #[test]
    fn test_config_yaml_sections() {
        let yaml = r"
rag:
  chunk_size: 500
  chunk_overlap: 50
embedding:
  provider: mock
  fallback_dimension: 64
store:
  metadata_encoding: native
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rag.chunk_size(), 500);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Mock);
        assert_eq!(config.embedding.fallback_dimension, 64);
        assert_eq!(config.store.metadata_encoding, MetadataEncoding::Native);
        assert_eq!(config.store.candidate_limit, 1000);
        assert!(!config.generation.enabled);
    }
}
