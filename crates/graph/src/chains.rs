//! LLM-backed implementations of the generative collaborators.
//!
//! Each collaborator renders its prompt definition, sends one completion
//! request, and post-processes the text. Failures from the shared LLM client
//! are re-tagged with the collaborator's role.

use crate::collaborators::{AnswerGenerator, ContentFilter, QueryRewriter, Relevance, RelevanceJudge};
use herbwise_core::{AppError, AppResult, Collaborator};
use herbwise_knowledge::Passage;
use herbwise_llm::{LlmClient, LlmRequest};
use herbwise_prompt::{build_prompt, PromptDefinition, PromptSet, NOT_FOUND_ANSWER};
use std::collections::HashMap;
use std::sync::Arc;

/// One prompt bound to one model.
#[derive(Clone)]
pub struct LlmChain {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    role: Collaborator,
}

impl LlmChain {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        role: Collaborator,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            role,
        }
    }

    /// Render the prompt with `variables` and return the completion text.
    pub async fn invoke(&self, variables: HashMap<String, String>) -> AppResult<String> {
        let built = build_prompt(&self.prompt, variables)?;

        let mut request =
            LlmRequest::new(built.user, &self.model).with_temperature(built.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if let Some(max_tokens) = built.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if built.json_output {
            request = request.with_json_mode();
        }

        tracing::debug!(
            role = %self.role,
            prompt = %built.metadata.source_prompt_id,
            provider = self.client.provider_name(),
            "Sending completion request"
        );

        let response = self
            .client
            .complete(&request)
            .await
            .map_err(|e| e.for_collaborator(self.role))?;

        Ok(response.content)
    }
}

fn vars<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Parse a grader's answer.
///
/// Accepts `{"binary_score": "yes"|"no"}` or a bare `yes`/`no`, quoted or
/// not, case- and whitespace-insensitive. Anything else is malformed.
pub fn parse_judgment(raw: &str) -> AppResult<Relevance> {
    let trimmed = raw.trim();

    let word = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::String(word)) => word,
        Ok(value) => value
            .get("binary_score")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::malformed(
                    Collaborator::RelevanceJudge,
                    format!("no binary_score in {}", trimmed),
                )
            })?,
        Err(_) => trimmed.to_string(),
    };

    let word = word.trim().trim_matches(|c: char| c == '"' || c == '\'' || c == '.');

    match word.to_lowercase().as_str() {
        "yes" => Ok(Relevance::Yes),
        "no" => Ok(Relevance::No),
        other => Err(AppError::malformed(
            Collaborator::RelevanceJudge,
            format!("expected yes or no, got '{}'", other),
        )),
    }
}

/// Render passages as the bracketed context sections the answer prompt expects.
pub fn format_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| format!("[{}] (source: {})", p.content, p.source))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Relevance judge over the grade prompt.
pub struct LlmRelevanceJudge {
    chain: LlmChain,
}

impl LlmRelevanceJudge {
    pub fn new(client: Arc<dyn LlmClient>, model: &str, prompt: PromptDefinition) -> Self {
        Self {
            chain: LlmChain::new(client, model, prompt, Collaborator::RelevanceJudge),
        }
    }
}

#[async_trait::async_trait]
impl RelevanceJudge for LlmRelevanceJudge {
    async fn classify(&self, question: &str, passage: &Passage) -> AppResult<Relevance> {
        let raw = self
            .chain
            .invoke(vars([("question", question), ("passage", passage.content.as_str())]))
            .await?;
        parse_judgment(&raw)
    }
}

/// Question rewriter over the rewrite prompt.
pub struct LlmQueryRewriter {
    chain: LlmChain,
}

impl LlmQueryRewriter {
    pub fn new(client: Arc<dyn LlmClient>, model: &str, prompt: PromptDefinition) -> Self {
        Self {
            chain: LlmChain::new(client, model, prompt, Collaborator::Rewriter),
        }
    }
}

#[async_trait::async_trait]
impl QueryRewriter for LlmQueryRewriter {
    async fn rewrite(&self, question: &str) -> AppResult<String> {
        let raw = self.chain.invoke(vars([("question", question)])).await?;
        let rewritten = raw.trim().trim_matches('"').trim();

        if rewritten.is_empty() {
            return Err(AppError::malformed(
                Collaborator::Rewriter,
                "empty rewritten question",
            ));
        }

        Ok(rewritten.to_string())
    }
}

/// Web content filter over the revise prompt.
pub struct LlmContentFilter {
    chain: LlmChain,
}

impl LlmContentFilter {
    pub fn new(client: Arc<dyn LlmClient>, model: &str, prompt: PromptDefinition) -> Self {
        Self {
            chain: LlmChain::new(client, model, prompt, Collaborator::ContentFilter),
        }
    }
}

#[async_trait::async_trait]
impl ContentFilter for LlmContentFilter {
    async fn filter(&self, question: &str, raw_text: &str) -> AppResult<String> {
        let raw = self
            .chain
            .invoke(vars([("question", question), ("text", raw_text)]))
            .await?;
        Ok(raw.trim().to_string())
    }
}

/// Answer synthesizer over the answer prompt.
pub struct LlmAnswerGenerator {
    chain: LlmChain,
}

impl LlmAnswerGenerator {
    pub fn new(client: Arc<dyn LlmClient>, model: &str, prompt: PromptDefinition) -> Self {
        Self {
            chain: LlmChain::new(client, model, prompt, Collaborator::AnswerGenerator),
        }
    }
}

#[async_trait::async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(&self, question: &str, passages: &[Passage]) -> AppResult<String> {
        let context = format_context(passages);
        let raw = self
            .chain
            .invoke(vars([
                ("question", question),
                ("context", context.as_str()),
                ("notFoundPhrase", NOT_FOUND_ANSWER),
            ]))
            .await?;
        Ok(raw.trim().to_string())
    }
}

/// The four generative collaborators, sharing one client and model.
pub struct LlmCollaborators {
    pub judge: Arc<LlmRelevanceJudge>,
    pub rewriter: Arc<LlmQueryRewriter>,
    pub content_filter: Arc<LlmContentFilter>,
    pub generator: Arc<LlmAnswerGenerator>,
}

impl LlmCollaborators {
    pub fn new(client: Arc<dyn LlmClient>, model: &str, prompts: PromptSet) -> Self {
        Self {
            judge: Arc::new(LlmRelevanceJudge::new(client.clone(), model, prompts.grade)),
            rewriter: Arc::new(LlmQueryRewriter::new(client.clone(), model, prompts.rewrite)),
            content_filter: Arc::new(LlmContentFilter::new(
                client.clone(),
                model,
                prompts.revise,
            )),
            generator: Arc::new(LlmAnswerGenerator::new(client, model, prompts.answer)),
        }
    }
}
