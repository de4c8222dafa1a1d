//! Command handlers for the herbwise CLI.

pub mod ask;
pub mod prompts;
pub mod search;

pub use ask::AskCommand;
pub use prompts::PromptsCommand;
pub use search::SearchCommand;
