//! Tagged results for the pipeline's fallback chains
//!
//! Every stage that can degrade (embedding, retrieval, answering) returns an
//! [`Outcome`]: either the primary tier produced the value, or a named
//! fallback tier did. Callers and tests inspect the tier instead of relying
//! on error types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fallback tier that produced a degraded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTier {
    /// Hash-seeded embedding instead of the configured provider
    DeterministicEmbedding,
    /// Text-contains search instead of similarity ranking
    LexicalSearch,
    /// Sentence extraction instead of a generative answer
    ExtractiveAnswer,
}

impl fmt::Display for FallbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DeterministicEmbedding => "deterministic_embedding",
            Self::LexicalSearch => "lexical_search",
            Self::ExtractiveAnswer => "extractive_answer",
        };
        f.write_str(s)
    }
}

/// Why a value came from a fallback tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    pub tier: FallbackTier,
    pub reason: String,
}

impl Fallback {
    pub fn new(tier: FallbackTier, reason: impl Into<String>) -> Self {
        Self {
            tier,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tier, self.reason)
    }
}

/// A value tagged with the tier that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// Produced by the configured, primary backend
    Primary(T),
    /// Produced by a fallback tier
    Degraded { value: T, fallback: Fallback },
}

impl<T> Outcome<T> {
    pub fn degraded(value: T, tier: FallbackTier, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            fallback: Fallback::new(tier, reason),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Primary(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Primary(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        match self {
            Self::Primary(_) => None,
            Self::Degraded { fallback, .. } => Some(fallback),
        }
    }

    /// Tier that produced the value, `None` for the primary tier
    pub fn tier(&self) -> Option<FallbackTier> {
        self.fallback().map(|f| f.tier)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Self::Primary(value) => Outcome::Primary(f(value)),
            Self::Degraded { value, fallback } => Outcome::Degraded {
                value: f(value),
                fallback,
            },
        }
    }

    /// Split into the value and its fallback, if any
    pub fn into_parts(self) -> (T, Option<Fallback>) {
        match self {
            Self::Primary(value) => (value, None),
            Self::Degraded { value, fallback } => (value, Some(fallback)),
        }
    }
}
