//! Document store adapters

pub mod memory;

pub use memory::InMemoryDocumentStore;
