//! Domain layer for the ragline retrieval pipeline
//!
//! Core models, the error vocabulary and the ports the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ConfigError, DomainError, DomainResult};
