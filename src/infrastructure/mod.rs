//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Vector primitives: chunking, hashing, TF-IDF, similarity
//!
//! Infrastructure has no knowledge of the pipeline services built on top.

pub mod config;
pub mod logging;
pub mod vector;
