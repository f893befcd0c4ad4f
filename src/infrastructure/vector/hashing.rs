//! Deterministic hash-seeded embeddings
//!
//! The universal fallback embedding: the SHA-256 digest of the text seeds a
//! PRNG which draws a fixed-length vector in `[-1, 1)`, then normalized to
//! unit length. Equal texts always map to equal vectors; the vectors carry
//! no semantic meaning.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use super::similarity::l2_normalize;

/// Default dimension of hash-seeded vectors
pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Deterministic, text-seeded embedder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed `text` into a unit-length vector of [`Self::dimension`] values
    pub fn embed(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);

        let mut rng = StdRng::from_seed(seed);
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|_| rng.gen_range(-1.0f32..1.0))
            .collect();

        l2_normalize(&mut vector);
        vector
    }
}
