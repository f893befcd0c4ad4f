use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

use crate::domain::errors::ConfigError;
use crate::domain::models::config::Config;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const VALID_ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .ragline/config.yaml (project config)
    /// 3. .ragline/local.yaml (project local overrides, optional)
    /// 4. Environment variables (RAGLINE_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("RAGLINE_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".ragline/config.yaml"))
            .merge(Yaml::file(".ragline/local.yaml"))
            .merge(Env::prefixed("RAGLINE_").split("__"))
    }

    /// Validate configuration after loading
    ///
    /// `RagConfig` validates itself on deserialization; this covers the
    /// remaining sections.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Logging
        if !VALID_LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !VALID_LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !VALID_ROTATIONS.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        // Embedding
        let embedding = &config.embedding;
        if embedding.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "embedding.model cannot be empty".to_string(),
            ));
        }
        if embedding.dimension == 0 || embedding.fallback_dimension == 0 {
            return Err(ConfigError::ValidationFailed(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }
        if embedding.max_batch_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "embedding.max_batch_size must be greater than 0".to_string(),
            ));
        }
        if embedding.max_features == 0 {
            return Err(ConfigError::ValidationFailed(
                "embedding.max_features must be greater than 0".to_string(),
            ));
        }

        // Generation
        if config.generation.enabled && config.generation.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "generation.model cannot be empty when generation is enabled".to_string(),
            ));
        }
        if config.generation.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "generation.max_tokens must be greater than 0".to_string(),
            ));
        }

        // Store
        if config.store.candidate_limit == 0 {
            return Err(ConfigError::ValidationFailed(
                "store.candidate_limit must be greater than 0".to_string(),
            ));
        }
        if config.store.knowledge_base_path.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "store.knowledge_base_path cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
