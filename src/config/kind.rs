//! Logical model types and the agent → model type table.
//!
//! A [`ModelKind`] says *why* a model is requested, not which provider
//! serves it; the configuration document binds each kind to a provider block.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifies the purpose of a model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// General-purpose chat.
    Basic,
    /// Extended reasoning / thinking models.
    Reasoning,
    /// Multimodal models accepting images.
    Vision,
    /// Code generation.
    Code,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [Self::Basic, Self::Reasoning, Self::Vision, Self::Code];

    /// Parses a logical type name. Matching is case-insensitive.
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "reasoning" => Ok(Self::Reasoning),
            "vision" => Ok(Self::Vision),
            "code" => Ok(Self::Code),
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Reasoning => "reasoning",
            Self::Vision => "vision",
            Self::Code => "code",
        }
    }

    /// Top-level key of this kind's block in the configuration document.
    pub fn config_key(&self) -> &'static str {
        match self {
            Self::Basic => "BASIC_MODEL",
            Self::Reasoning => "REASONING_MODEL",
            Self::Vision => "VISION_MODEL",
            Self::Code => "CODE_MODEL",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agents and the model kind each one runs on.
const AGENT_MODEL_KINDS: &[(&str, ModelKind)] = &[
    ("coordinator", ModelKind::Basic),
    ("planner", ModelKind::Basic),
    ("researcher", ModelKind::Basic),
    ("coder", ModelKind::Code),
    ("reporter", ModelKind::Basic),
    ("analyst", ModelKind::Reasoning),
    ("vision", ModelKind::Vision),
];

/// Returns the model kind an agent should use. Unknown agents run on `Basic`.
pub fn agent_model_kind(agent: &str) -> ModelKind {
    AGENT_MODEL_KINDS
        .iter()
        .find(|(name, _)| *name == agent)
        .map(|(_, kind)| *kind)
        .unwrap_or(ModelKind::Basic)
}
