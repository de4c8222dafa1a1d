//! Configuration management for herbwise.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config file (.herbwise/config.yaml, or HERBWISE_CONFIG)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. Service credentials are never stored in the file; the
//! file names the environment variable that holds them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".herbwise";

/// Collection the encyclopedia was indexed into.
pub const DEFAULT_COLLECTION: &str = "medical_herbs_rag_instructor_embeddings";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .herbwise/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("ollama", "groq")
    pub provider: String,

    /// Model identifier for the active provider
    pub model: String,

    /// Explicit API key override for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log line format ("pretty", "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Knowledge-store collection queried when the caller names none
    pub collection: String,

    /// LLM provider configurations
    pub llm: LlmConfig,

    /// Control-loop tuning
    pub workflow: WorkflowConfig,

    /// Vector store connection
    pub store: StoreConfig,

    /// Query embedding service
    pub embedding: EmbeddingConfig,

    /// Web search fallback
    pub web_search: WebSearchConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let mut providers = HashMap::new();
        providers.insert(
            "ollama".to_string(),
            ProviderConfig::Ollama {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
            },
        );
        providers.insert(
            "groq".to_string(),
            ProviderConfig::Groq {
                api_key_env: "GROQ_KEY".to_string(),
                model: "llama3-8b-8192".to_string(),
                endpoint: None,
            },
        );

        Self {
            active_provider: "ollama".to_string(),
            providers,
        }
    }
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Groq {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            Self::Groq { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Groq { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }
}

/// What the relevance filter does with a judgment that is neither yes nor no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedJudgmentPolicy {
    /// Drop the passage (fail-closed)
    #[default]
    Exclude,
    /// Keep the passage (fail-open)
    Include,
}

/// Control-loop tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Generate only when strictly more relevant passages than this survive grading
    pub relevance_threshold: usize,

    /// Maximum number of query rewrites before escalating to web search
    pub rewrite_ceiling: u32,

    /// Upper bound on passages returned by one retrieval
    pub top_k: usize,

    /// Similarity score below which the store drops results
    pub score_floor: f32,

    /// Per-call budget for every collaborator call, in seconds
    pub call_timeout_secs: u64,

    /// Maximum relevance judgments in flight at once
    pub grading_concurrency: usize,

    /// Handling of judgments outside the yes/no contract
    pub malformed_judgment: MalformedJudgmentPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: 2,
            rewrite_ceiling: 2,
            top_k: 10,
            score_floor: 0.8,
            call_timeout_secs: 30,
            grading_concurrency: 4,
            malformed_judgment: MalformedJudgmentPolicy::Exclude,
        }
    }
}

/// Vector store connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Store backend (only "qdrant" is supported)
    pub provider: String,

    /// Qdrant gRPC endpoint
    pub url: String,

    /// Environment variable that overrides `url`
    pub url_env: String,

    /// Environment variable holding the Qdrant API key
    pub api_key_env: String,

    /// HNSW beam width used at query time
    pub hnsw_ef: u32,

    /// Bypass the approximate index and scan exactly
    pub exact: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: "qdrant".to_string(),
            url: "http://localhost:6334".to_string(),
            url_env: "QDRANT_DB_URL".to_string(),
            api_key_env: "QDRANT_KEY".to_string(),
            hnsw_ef: 128,
            exact: true,
        }
    }
}

impl StoreConfig {
    /// Resolve the Qdrant URL, preferring the environment.
    pub fn resolve_url(&self) -> String {
        std::env::var(&self.url_env).unwrap_or_else(|_| self.url.clone())
    }

    /// Resolve the Qdrant API key from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }
}

/// Query embedding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingConfig {
    /// Provider name ("ollama", "mock")
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Provider endpoint
    pub endpoint: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Instruction prepended to every query before embedding
    pub query_instruction: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            dimensions: 768,
            query_instruction: "Represent the question for retrieving supporting documents: "
                .to_string(),
        }
    }
}

/// Web search fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebSearchConfig {
    /// Tavily search endpoint
    pub endpoint: String,

    /// Environment variable holding the Tavily API key
    pub api_key_env: String,

    /// Maximum snippets requested per search
    pub max_results: usize,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            api_key_env: "TAVILY_API_KEY".to_string(),
            max_results: 5,
        }
    }
}

impl WebSearchConfig {
    /// Resolve the search API key from the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
    collection: Option<String>,
    workflow: Option<WorkflowConfig>,
    store: Option<StoreConfig>,
    embedding: Option<EmbeddingConfig>,
    web_search: Option<WebSearchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let llm = LlmConfig::default();
        let model = llm
            .providers
            .get(&llm.active_provider)
            .map(|p| p.model().to_string())
            .unwrap_or_else(|| "llama3".to_string());

        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: llm.active_provider.clone(),
            model,
            api_key: None,
            log_level: None,
            log_format: "pretty".to_string(),
            verbose: false,
            no_color: false,
            collection: DEFAULT_COLLECTION.to_string(),
            llm,
            workflow: WorkflowConfig::default(),
            store: StoreConfig::default(),
            embedding: EmbeddingConfig::default(),
            web_search: WebSearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and environment variables.
    ///
    /// Environment variables:
    /// - `HERBWISE_WORKSPACE`: Override workspace path
    /// - `HERBWISE_CONFIG`: Path to config file
    /// - `HERBWISE_PROVIDER`: LLM provider
    /// - `HERBWISE_MODEL`: Model identifier
    /// - `HERBWISE_API_KEY`: API key for the LLM provider
    /// - `HERBWISE_COLLECTION`: Default collection
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use herbwise_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Collection: {}", config.collection);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("HERBWISE_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("HERBWISE_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("HERBWISE_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("HERBWISE_MODEL") {
            config.model = model;
        }

        if let Ok(collection) = std::env::var("HERBWISE_COLLECTION") {
            config.collection = collection;
        }

        config.api_key = std::env::var("HERBWISE_API_KEY").ok();

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    pub fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }
            result.llm = llm;
        }

        if let Some(collection) = config_file.collection {
            result.collection = collection;
        }
        if let Some(workflow) = config_file.workflow {
            result.workflow = workflow;
        }
        if let Some(store) = config_file.store {
            result.store = store;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(web_search) = config_file.web_search {
            result.web_search = web_search;
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            // A provider switch without an explicit model picks that provider's model
            if let Some(pc) = self.llm.providers.get(&provider) {
                self.model = pc.model().to_string();
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .herbwise directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.providers.get(provider)
    }

    /// Endpoint configured for a provider, if any.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint().map(str::to_string))
    }

    /// Resolve API key from environment variable.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        match self.get_provider_config(provider)? {
            ProviderConfig::Groq { api_key_env, .. } => std::env::var(api_key_env).ok(),
            ProviderConfig::Ollama { .. } => None,
        }
    }

    /// Call budget for a single collaborator call.
    pub fn call_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.workflow.call_timeout_secs)
    }

    /// Validate configuration before any collaborator is built.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "groq"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if let Some(ProviderConfig::Groq { api_key_env, .. }) =
            self.get_provider_config(&self.provider)
        {
            if self.api_key.is_none() && std::env::var(api_key_env).is_err() {
                return Err(AppError::Config(format!(
                    "API key not found in environment variable: {}",
                    api_key_env
                )));
            }
        }

        let known_embedders = ["ollama", "mock"];
        if !known_embedders.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedders.join(", ")
            )));
        }

        let known_stores = ["qdrant"];
        if !known_stores.contains(&self.store.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown store provider: {}. Supported: {}",
                self.store.provider,
                known_stores.join(", ")
            )));
        }

        if self.workflow.grading_concurrency == 0 {
            return Err(AppError::Config(
                "workflow.gradingConcurrency must be at least 1".to_string(),
            ));
        }

        if self.workflow.call_timeout_secs == 0 {
            return Err(AppError::Config(
                "workflow.callTimeoutSecs must be at least 1".to_string(),
            ));
        }

        if self.workflow.top_k == 0 {
            return Err(AppError::Config(
                "workflow.topK must be at least 1".to_string(),
            ));
        }

        if !(-1.0..=1.0).contains(&self.workflow.score_floor) {
            return Err(AppError::Config(format!(
                "workflow.scoreFloor must lie in [-1, 1], got {}",
                self.workflow.score_floor
            )));
        }

        Ok(())
    }
}
