//! LLM integration crate for herbwise.
//!
//! This crate provides a provider-agnostic abstraction for text completion.
//! Every generative step of the question-answering loop (grading, rewriting,
//! web content filtering, answering) goes through one `LlmClient`.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **Groq**: Hosted, OpenAI-compatible chat completions
//!
//! # Example
//! ```no_run
//! use herbwise_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("What is valerian used for?", "llama3");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
pub use types::ProviderType;
