//! Ask command handler.
//!
//! Runs one question through the corrective retrieval workflow and prints
//! the answer to stdout.

use crate::runtime;
use clap::Args;
use herbwise_core::{config::AppConfig, AppError, AppResult};
use herbwise_graph::{SessionOutcome, SessionRequest};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Ask a question about medicinal herbs
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Knowledge-store collection to query
    #[arg(long)]
    pub collection: Option<String>,

    /// Retrieve once and answer, without grading, rewriting or web search
    #[arg(long)]
    pub direct: bool,

    /// Print the steps the session went through
    #[arg(long)]
    pub trace: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.read_question()?;
        let collection = self
            .collection
            .clone()
            .unwrap_or_else(|| config.collection.clone());

        let workflow = runtime::build_workflow(config)?;
        let request = SessionRequest::new(question, collection);

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling session");
                on_interrupt.cancel();
            }
        });

        let result = if self.direct {
            workflow.run_direct(request, cancel).await
        } else {
            workflow.run(request, cancel).await
        };
        interrupt.abort();

        self.print(&result?)
    }

    fn read_question(&self) -> AppResult<String> {
        let question = match (&self.question, &self.file) {
            (Some(q), _) => q.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(AppError::Config("No question provided".to_string()));
            }
        };

        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Config("Question is empty".to_string()));
        }
        Ok(question.to_string())
    }

    fn print(&self, outcome: &SessionOutcome) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            return Ok(());
        }

        println!("{}", outcome.generation);

        if !outcome.documents.is_empty() {
            println!();
            println!("Sources:");
            let mut seen = Vec::new();
            for passage in &outcome.documents {
                if !seen.contains(&passage.source) {
                    println!("  - {}", passage.source);
                    seen.push(passage.source.clone());
                }
            }
        }

        if self.trace {
            println!();
            println!(
                "Session {} ({} rewrites{})",
                outcome.session_id,
                outcome.retry_count,
                if outcome.web_escalated {
                    ", web search"
                } else {
                    ""
                }
            );
            for record in &outcome.trace {
                println!(
                    "  {:<16} {:>3} passages  {}",
                    record.step.as_str(),
                    record.document_count,
                    record.question
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(question: Option<&str>, file: Option<PathBuf>) -> AskCommand {
        AskCommand {
            question: question.map(str::to_string),
            file,
            collection: None,
            direct: false,
            trace: false,
            json: false,
        }
    }

    #[test]
    fn test_question_from_argument_is_trimmed() {
        let cmd = command(Some("  What is feverfew for?\n"), None);
        assert_eq!(cmd.read_question().unwrap(), "What is feverfew for?");
    }

    #[test]
    fn test_question_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("question.txt");
        std::fs::write(&path, "Is St John's wort safe with other drugs?\n").unwrap();

        let cmd = command(None, Some(path));
        assert_eq!(
            cmd.read_question().unwrap(),
            "Is St John's wort safe with other drugs?"
        );
    }

    #[test]
    fn test_missing_or_blank_question_rejected() {
        assert!(command(None, None).read_question().is_err());
        assert!(command(Some("   "), None).read_question().is_err());
    }
}
