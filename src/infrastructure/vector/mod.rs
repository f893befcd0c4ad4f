//! Vector infrastructure components
//!
//! Text chunking, similarity math and the two local embedding models
//! (hash-seeded and TF-IDF) used by the retrieval pipeline.

pub mod chunker;
pub mod hashing;
pub mod similarity;
pub mod tfidf;

pub use chunker::Chunker;
pub use hashing::{HashEmbedder, DEFAULT_HASH_DIMENSION};
pub use similarity::{cosine_similarity, l2_normalize};
pub use tfidf::TfIdfVectorizer;
