//! Minijinja renderer over the prompt templates embedded in the binary.

use include_dir::{Dir, include_dir};
use minijinja::{Environment, UndefinedBehavior};
use serde_json::Value;

use crate::domain::{AppError, TemplateRenderer};

static PROMPTS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/prompts");

/// Renders the built-in `sections/` and `turns/` templates.
#[derive(Debug)]
pub struct EmbeddedPromptRenderer {
    env: Environment<'static>,
}

impl EmbeddedPromptRenderer {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        register_templates(&mut env, &PROMPTS_DIR)?;
        Ok(Self { env })
    }

    /// Names of every registered template.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.env.templates().map(|(name, _)| name).collect();
        names.sort_unstable();
        names
    }
}

impl TemplateRenderer for EmbeddedPromptRenderer {
    fn render(&self, template_name: &str, context: &Value) -> Result<String, AppError> {
        let template = self.env.get_template(template_name).map_err(|e| {
            AppError::PromptComposition(format!("Failed to load template '{}': {}", template_name, e))
        })?;

        template.render(context).map_err(|e| {
            AppError::PromptComposition(format!("Failed to render template '{}': {}", template_name, e))
        })
    }
}

fn register_templates(env: &mut Environment<'static>, dir: &'static Dir<'static>) -> Result<(), AppError> {
    for file in dir.files() {
        let Some(name) = file.path().to_str() else {
            continue;
        };
        let source = file.contents_utf8().ok_or_else(|| {
            AppError::PromptComposition(format!("Template '{}' is not valid UTF-8", name))
        })?;
        env.add_template(name, source).map_err(|e| {
            AppError::PromptComposition(format!("Failed to register template '{}': {}", name, e))
        })?;
    }
    for subdir in dir.dirs() {
        register_templates(env, subdir)?;
    }
    Ok(())
}
