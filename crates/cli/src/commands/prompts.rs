//! Prompts command handler.

use clap::Args;
use herbwise_core::{config::AppConfig, AppResult};
use herbwise_prompt::{list_prompts, load_prompt, PromptOrigin};

/// List the prompt definitions in use, or show one
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Show the full definition of this prompt
    #[arg(long)]
    pub show: Option<String>,
}

impl PromptsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let state_dir = config.state_dir();

        if let Some(id) = &self.show {
            let prompt = load_prompt(Some(&state_dir), id)?;
            println!("{}", serde_yaml::to_string(&prompt)?);
            return Ok(());
        }

        for summary in list_prompts(Some(&state_dir))? {
            let origin = match &summary.origin {
                PromptOrigin::Builtin => "builtin".to_string(),
                PromptOrigin::Workspace(path) => path.display().to_string(),
            };
            println!("{:<20} {:<36} {}", summary.id, summary.title, origin);
        }

        Ok(())
    }
}
