//! Prompt loader for built-in and workspace prompt definitions.
//!
//! Every prompt the workflow uses ships compiled into the binary. A workspace
//! may override any of them by dropping `<id>.yml` into `.herbwise/prompts/`.

use crate::ids;
use crate::types::PromptDefinition;
use herbwise_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (ids::GRADE, include_str!("../prompts/herbwise.grade.yml")),
    (ids::REWRITE, include_str!("../prompts/herbwise.rewrite.yml")),
    (ids::REVISE, include_str!("../prompts/herbwise.revise.yml")),
    (ids::ANSWER, include_str!("../prompts/herbwise.answer.yml")),
];

/// Where a prompt definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOrigin {
    /// Compiled into the binary
    Builtin,
    /// Loaded from the workspace prompts directory
    Workspace(PathBuf),
}

/// One row of `list_prompts`.
#[derive(Debug, Clone)]
pub struct PromptSummary {
    pub id: String,
    pub title: String,
    pub origin: PromptOrigin,
}

/// The four prompt definitions one workflow session needs.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub grade: PromptDefinition,
    pub rewrite: PromptDefinition,
    pub revise: PromptDefinition,
    pub answer: PromptDefinition,
}

impl PromptSet {
    /// Load all workflow prompts, honoring workspace overrides.
    pub fn load(state_dir: Option<&Path>) -> AppResult<Self> {
        Ok(Self {
            grade: load_prompt(state_dir, ids::GRADE)?,
            rewrite: load_prompt(state_dir, ids::REWRITE)?,
            revise: load_prompt(state_dir, ids::REVISE)?,
            answer: load_prompt(state_dir, ids::ANSWER)?,
        })
    }

    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Self::load(None)
    }
}

/// Load a prompt definition by ID.
///
/// Looks for `<state_dir>/prompts/<id>.yml` first and falls back to the
/// built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use herbwise_prompt::{load_prompt, ids};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Some(Path::new(".herbwise")), ids::ANSWER)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(state_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(dir) = state_dir {
        let prompt_file = workspace_prompt_path(dir, prompt_id);
        if prompt_file.exists() {
            tracing::debug!("Loading prompt override from: {:?}", prompt_file);

            let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
                AppError::Prompt(format!(
                    "Failed to read prompt file {:?}: {}",
                    prompt_file, e
                ))
            })?;

            let definition = parse_prompt(&contents, &prompt_file.display().to_string())?;
            if definition.id != prompt_id {
                return Err(AppError::Prompt(format!(
                    "Prompt file {:?} declares id '{}', expected '{}'",
                    prompt_file, definition.id, prompt_id
                )));
            }

            tracing::info!("Using workspace prompt: {} ({})", definition.id, definition.title);
            return Ok(definition);
        }
    }

    let (_, contents) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

    parse_prompt(contents, prompt_id)
}

/// List all prompts, marking the ones a workspace file overrides.
///
/// Workspace files that do not shadow a built-in are listed too.
pub fn list_prompts(state_dir: Option<&Path>) -> AppResult<Vec<PromptSummary>> {
    let mut prompts = BTreeMap::new();

    for (id, contents) in BUILTIN_PROMPTS {
        let def = parse_prompt(contents, id)?;
        prompts.insert(
            id.to_string(),
            PromptSummary {
                id: id.to_string(),
                title: def.title,
                origin: PromptOrigin::Builtin,
            },
        );
    }

    if let Some(dir) = state_dir {
        let prompts_dir = dir.join("prompts");
        if prompts_dir.exists() {
            for entry in walkdir::WalkDir::new(&prompts_dir)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("yml") {
                    continue;
                }

                let contents = std::fs::read_to_string(path)?;
                match parse_prompt(&contents, &path.display().to_string()) {
                    Ok(def) => {
                        prompts.insert(
                            def.id.clone(),
                            PromptSummary {
                                id: def.id,
                                title: def.title,
                                origin: PromptOrigin::Workspace(path.to_path_buf()),
                            },
                        );
                    }
                    Err(e) => tracing::warn!("Skipping invalid prompt file {:?}: {}", path, e),
                }
            }
        }
    }

    Ok(prompts.into_values().collect())
}

fn workspace_prompt_path(state_dir: &Path, prompt_id: &str) -> PathBuf {
    state_dir.join("prompts").join(format!("{}.yml", prompt_id))
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}
