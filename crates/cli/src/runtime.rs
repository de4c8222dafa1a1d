//! Wiring of collaborators from configuration.

use herbwise_core::{config::AppConfig, AppError, AppResult};
use herbwise_graph::{Collaborators, LlmCollaborators, Workflow, WorkflowOptions};
use herbwise_knowledge::{
    create_provider, create_store, KnowledgeRetriever, Retriever, TavilySearch,
};
use herbwise_llm::{create_client, LlmClient};
use herbwise_prompt::PromptSet;
use std::sync::Arc;

/// Build the retriever described by the configuration.
pub fn build_retriever(config: &AppConfig) -> AppResult<Arc<dyn Retriever>> {
    let embedder = create_provider(&config.embedding)?;
    let store = create_store(&config.store)?;

    tracing::debug!(
        embedder = embedder.provider_name(),
        model = embedder.model_name(),
        store = store.backend_name(),
        "Built retriever"
    );

    Ok(Arc::new(KnowledgeRetriever::from_config(
        embedder,
        store,
        &config.embedding,
        &config.workflow,
    )))
}

/// Build the LLM client for the active provider.
pub fn build_llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);

    create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
        .map_err(AppError::Config)
}

/// Build a ready-to-run workflow.
pub fn build_workflow(config: &AppConfig) -> AppResult<Workflow> {
    let prompts = PromptSet::load(Some(&config.state_dir()))?;
    let client = build_llm_client(config)?;
    let llm = LlmCollaborators::new(client, &config.model, prompts);

    let collaborators = Collaborators {
        retriever: build_retriever(config)?,
        judge: llm.judge,
        rewriter: llm.rewriter,
        web_search: Arc::new(TavilySearch::from_config(&config.web_search)),
        content_filter: llm.content_filter,
        generator: llm.generator,
    };

    Ok(Workflow::new(
        collaborators,
        WorkflowOptions::from(&config.workflow),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.embedding.provider = "mock".to_string();
        config
    }

    #[tokio::test]
    async fn test_build_workflow_offline() {
        let config = offline_config();
        let workflow = build_workflow(&config).unwrap();
        assert_eq!(workflow.options().policy.rewrite_ceiling, 2);
        assert_eq!(workflow.options().grading_concurrency, 4);
    }

    #[test]
    fn test_unknown_store_is_config_error() {
        let mut config = offline_config();
        config.store.provider = "pinecone".to_string();
        assert!(matches!(build_retriever(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_memory_store_is_not_selectable() {
        let mut config = offline_config();
        config.store.provider = "memory".to_string();
        assert!(matches!(build_retriever(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_unknown_llm_provider_is_config_error() {
        let mut config = offline_config();
        config.provider = "bard".to_string();
        assert!(matches!(build_llm_client(&config), Err(AppError::Config(_))));
    }
}
