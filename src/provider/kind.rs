//! Provider identity enumeration.

use serde::Serialize;

/// Identifies which backend serves a configuration block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Any OpenAI-compatible chat completions endpoint.
    OpenAi,
    /// Azure OpenAI deployments.
    Azure,
    /// Google AI Studio (Gemini API).
    GoogleAiStudio,
    /// Alibaba Dashscope, OpenAI-compatible with a thinking switch.
    Dashscope,
    /// DeepSeek reasoning models.
    DeepSeek,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Azure => "azure",
            Self::GoogleAiStudio => "google_aistudio",
            Self::Dashscope => "dashscope",
            Self::DeepSeek => "deepseek",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
