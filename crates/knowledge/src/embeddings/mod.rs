//! Query embedding.
//!
//! The knowledge store compares vectors, so every question is embedded
//! before it is searched. Providers are interchangeable behind
//! [`EmbeddingProvider`].

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
