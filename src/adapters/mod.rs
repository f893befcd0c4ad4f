//! Adapters implementing the domain ports
//!
//! - `embeddings`: OpenAI-compatible embedding backend
//! - `generation`: OpenAI-compatible chat completion backend
//! - `store`: in-memory document store

pub mod embeddings;
pub mod generation;
pub mod store;
