//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a prompt loader that checks `user_dir` before the embedded templates
    pub fn new(user_dir: Option<&Path>) -> Self {
        debug!(?user_dir, "PromptLoader::new: called");
        let user_dir = match user_dir {
            Some(dir) if dir.is_dir() => {
                debug!("PromptLoader::new: user override directory found");
                Some(dir.to_path_buf())
            }
            Some(dir) => {
                debug!(?dir, "PromptLoader::new: user override directory missing, ignoring");
                None
            }
            None => {
                debug!("PromptLoader::new: no user override directory");
                None
            }
        };

        Self {
            hbs: engine(),
            user_dir,
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: engine(),
            user_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{user_dir}/{name}.pmt`
    /// 2. Embedded fallback
    pub fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        debug!(%name, "PromptLoader::load_template: not found anywhere");
        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

/// Prompts are plain text, so nothing is HTML-escaped
fn engine() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    hbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_prompt_loader_group() {
        let loader = PromptLoader::embedded_only();
        let content = loader.load_template("group").unwrap();
        assert!(content.contains("Individuals (in composition order"));
    }

    #[test]
    fn test_prompt_loader_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let result = loader.load_template("nonexistent-template");
        assert!(result.is_err());
    }

    #[test]
    fn test_user_override_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("group.pmt"), "Custom {{action}}").unwrap();

        let loader = PromptLoader::new(Some(temp.path()));
        let rendered = loader.render("group", &json!({ "action": "Duel" })).unwrap();
        assert_eq!(rendered, "Custom Duel");
    }

    #[test]
    fn test_missing_user_dir_falls_back() {
        let temp = TempDir::new().unwrap();
        let loader = PromptLoader::new(Some(&temp.path().join("absent")));
        assert!(loader.load_template("group").is_ok());
    }

    #[test]
    fn test_render_does_not_escape() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("plain.pmt"), "{{label}}").unwrap();

        let loader = PromptLoader::new(Some(temp.path()));
        let rendered = loader.render("plain", &json!({ "label": "Orc <\"Chief\"> & co" })).unwrap();
        assert_eq!(rendered, "Orc <\"Chief\"> & co");
    }
}
