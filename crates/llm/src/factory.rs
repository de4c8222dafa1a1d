//! LLM provider factory.
//!
//! This module creates LLM clients from a provider name, resolving the
//! endpoint and enforcing secret requirements before any request is sent.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "groq")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns error if:
/// - Provider is unknown
/// - Required secrets are missing
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(format!(
            "Provider '{}' requires API key",
            provider_type.as_str()
        ));
    }

    match provider_type {
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            tracing::debug!("Creating Ollama client at {}", base_url);
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        ProviderType::Groq => {
            let api_key = api_key.unwrap_or_default();
            let base_url = endpoint.unwrap_or(crate::providers::groq::DEFAULT_GROQ_URL);
            tracing::debug!("Creating Groq client at {}", base_url);
            Ok(Arc::new(GroqClient::with_base_url(base_url, api_key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_groq_client() {
        let client = create_client("groq", None, Some("gsk_test")).unwrap();
        assert_eq!(client.provider_name(), "groq");
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None) {
            Err(err) => assert_eq!(err, "Provider 'groq' requires API key"),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        let client = create_client("Ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");

        match create_client("GROQ", None, None) {
            Err(err) => assert_eq!(err, "Provider 'groq' requires API key"),
            Ok(_) => panic!("Expected error for Groq without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
