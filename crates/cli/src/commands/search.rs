//! Search command handler.
//!
//! Shows what the knowledge store returns for a question, before any
//! relevance grading.

use crate::runtime;
use clap::Args;
use herbwise_core::{config::AppConfig, AppError, AppResult, Collaborator};

/// Retrieve candidate passages without answering
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// The question to search for
    pub question: String,

    /// Knowledge-store collection to query
    #[arg(long)]
    pub collection: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let collection = self.collection.as_deref().unwrap_or(&config.collection);
        let retriever = runtime::build_retriever(config)?;

        let passages = tokio::time::timeout(
            config.call_timeout(),
            retriever.retrieve(collection, &self.question),
        )
        .await
        .map_err(|_| {
            AppError::unavailable(
                Collaborator::KnowledgeStore,
                format!("no response within {}s", config.workflow.call_timeout_secs),
            )
        })??;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&passages)?);
            return Ok(());
        }

        if passages.is_empty() {
            println!("No passages above the score floor ({}).", config.workflow.score_floor);
            return Ok(());
        }

        for (i, passage) in passages.iter().enumerate() {
            println!("{}. [{}]", i + 1, passage.source);
            println!("   {}", passage.content.replace('\n', "\n   "));
        }

        Ok(())
    }
}
