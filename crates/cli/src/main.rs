//! Herbwise CLI
//!
//! Main entry point for the herbwise command-line tool.
//! Answers questions about medicinal herbs from an encyclopedia knowledge
//! base, falling back to web search when the encyclopedia comes up short.

mod commands;
mod runtime;

use clap::{Parser, Subcommand};
use commands::{AskCommand, PromptsCommand, SearchCommand};
use herbwise_core::logging::{self, LogFormat};
use herbwise_core::{config::AppConfig, AppError, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;

/// Herbwise - answers from the herbal encyclopedia
#[derive(Parser, Debug)]
#[command(name = "herbwise")]
#[command(about = "Question answering over an encyclopedia of medicinal herbs", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "HERBWISE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "HERBWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log line format (pretty, json)
    #[arg(long, global = true, env = "HERBWISE_LOG_FORMAT")]
    log_format: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (ollama, groq)
    #[arg(short, long, global = true, env = "HERBWISE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "HERBWISE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about medicinal herbs
    Ask(AskCommand),

    /// Retrieve candidate passages without answering
    Search(SearchCommand),

    /// List the prompt definitions in use
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Defaults, config file and environment
    let mut config = AppConfig::load()?;

    // An explicit config file not already picked up from the environment
    if let Some(path) = &cli.config {
        if config.config_file.as_ref() != Some(path) {
            config = config.merge_yaml(path)?;
        }
    }

    // Apply CLI overrides
    let mut config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    let log_format = LogFormat::parse(&config.log_format).ok_or_else(|| {
        AppError::Config(format!("Unknown log format: {}", config.log_format))
    })?;

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("Herbwise CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
