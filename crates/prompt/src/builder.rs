//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, OutputFormat, PromptDefinition};
use herbwise_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// This function:
/// 1. Renders the system template (if any) with the provided variables
/// 2. Renders the user template with the same variables
/// 3. Carries sampling settings over from the definition
///
/// Rendering is strict: a template that references a variable missing from
/// `variables` is an error rather than an empty substitution.
///
/// # Example
/// ```no_run
/// use herbwise_prompt::{build_prompt, load_prompt, ids};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(None, ids::REWRITE)?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "What is passionflower for?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::trace!("Building prompt: {}", definition.id);

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &variables))
        .transpose()?;

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt {
        system,
        user,
        temperature: definition.behavior.temperature,
        max_tokens: definition.behavior.max_tokens,
        json_output: definition.output.format == OutputFormat::Json,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            resolved_variables: variables,
        },
    })
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PromptBehavior, PromptOutputSpec};

    fn create_test_definition(format: OutputFormat) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            behavior: PromptBehavior {
                temperature: 0.0,
                max_tokens: Some(32),
            },
            system: Some("Context:\n{{context}}".to_string()),
            template: "Question: {{question}}".to_string(),
            output: PromptOutputSpec { format },
        }
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Is <sage> safe?".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        // No HTML escaping of angle brackets
        assert_eq!(result, "Question: Is <sage> safe?");
    }

    #[test]
    fn test_missing_variable_is_error() {
        let vars = HashMap::new();
        let result = render_template("Question: {{question}}", &vars);
        assert!(matches!(result, Err(AppError::Prompt(_))));
    }

    #[test]
    fn test_build_prompt_renders_system_and_user() {
        let def = create_test_definition(OutputFormat::Markdown);
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "What is yarrow?".to_string());
        vars.insert("context".to_string(), "[yarrow heals wounds]".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.user, "Question: What is yarrow?");
        assert_eq!(
            built.system.as_deref(),
            Some("Context:\n[yarrow heals wounds]")
        );
        assert_eq!(built.max_tokens, Some(32));
        assert!(!built.json_output);
        assert_eq!(built.metadata.source_prompt_id, "test.prompt");
    }

    #[test]
    fn test_json_format_sets_json_output() {
        let def = create_test_definition(OutputFormat::Json);
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "q".to_string());
        vars.insert("context".to_string(), "c".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert!(built.json_output);
    }
}
