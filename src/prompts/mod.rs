//! Prompt templates rendered into system messages.
//!
//! Templates are Jinja files named `<name>.md` under a template root. Every
//! render sees `CURRENT_TIME`; [`PromptTemplates::apply`] also exposes the
//! caller's state, which overrides derived variables on collision.

mod state;

pub use state::PromptState;

use std::path::{Path, PathBuf};

use minijinja::{path_loader, Environment, UndefinedBehavior};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::{
    CURRENT_TIME_FORMAT, CURRENT_TIME_VAR, DEFAULT_PROMPTS_DIR, PROMPTS_DIR_ENV,
    TEMPLATE_EXTENSION,
};
use crate::error::{Error, Result};
use crate::message::Message;

/// Jinja templates loaded from a root directory, rendered with strict
/// undefined-variable checking.
pub struct PromptTemplates {
    root: PathBuf,
    env: Environment<'static>,
}

impl PromptTemplates {
    /// Loads templates from `root` on demand.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut env = Environment::new();
        env.set_loader(path_loader(&root));
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self { root, env }
    }

    /// Uses `MODELGATE_PROMPTS` when set, else the bundled `prompts/` directory.
    pub fn from_env() -> Self {
        let root = std::env::var(PROMPTS_DIR_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Renders `<name>.md` with only the derived variables.
    ///
    /// # Errors
    ///
    /// [`Error::Template`] when the file is missing or rendering fails.
    pub fn render_standalone(&self, name: &str) -> Result<String> {
        self.render(name, &derived_context())
    }

    /// Renders `<name>.md` against `state` and prepends the result as a
    /// system message to the state's conversation.
    ///
    /// Returns `[system, m1, m2, ...]` with the state's messages in their
    /// original order. `state` itself is never modified.
    pub fn apply(&self, name: &str, state: &PromptState) -> Result<Vec<Message>> {
        let mut context = derived_context();
        context.extend(state.vars.clone());
        let messages = serde_json::to_value(&state.messages).map_err(|e| Error::template(name, e))?;
        context.insert("messages".to_string(), messages);

        let system = self.render(name, &context)?;
        let mut out = Vec::with_capacity(state.messages.len() + 1);
        out.push(Message::system(system));
        out.extend(state.messages.iter().cloned());
        Ok(out)
    }

    fn render(&self, name: &str, context: &Map<String, Value>) -> Result<String> {
        let file = format!("{name}.{TEMPLATE_EXTENSION}");
        debug!(template = %file, root = %self.root.display(), "rendering prompt");
        let template = self
            .env
            .get_template(&file)
            .map_err(|e| Error::template(name, e))?;
        template.render(context).map_err(|e| Error::template(name, e))
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::from_env()
    }
}

impl std::fmt::Debug for PromptTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptTemplates")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

fn derived_context() -> Map<String, Value> {
    let now = chrono::Local::now().format(CURRENT_TIME_FORMAT).to_string();
    let mut context = Map::new();
    context.insert(CURRENT_TIME_VAR.to_string(), Value::String(now));
    context
}
