//! Caller-supplied state for prompt rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// Caller state fed into [`PromptTemplates::apply`](super::PromptTemplates::apply).
///
/// `messages` is the conversation so far; every other field becomes a
/// template variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub vars: Map<String, Value>,
}

impl PromptState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            vars: Map::new(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}
