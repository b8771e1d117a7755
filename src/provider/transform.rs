//! Provider selection and configuration rewriting.
//!
//! Selection is an ordered decision list where the first match wins:
//!
//! 1. `platform` is a Google AI Studio tag
//! 2. an Azure endpoint is configured (block or environment)
//! 3. `base_url` points at Dashscope
//! 4. the model kind is `reasoning` (DeepSeek)
//! 5. generic OpenAI-compatible
//!
//! Everything here is pure: the environment is read from an [`EnvSettings`]
//! snapshot and blocks are rewritten by value.

use serde_json::{Map, Value};

use super::http::Transport;
use super::kind::ProviderId;
use crate::config::{ConfigBlock, EnvSettings, ModelKind};
use crate::constants::{
    DASHSCOPE_HOST_MARKER, GOOGLE_AISTUDIO_PLATFORMS, KEY_API_BASE, KEY_API_KEY,
    KEY_AZURE_ENDPOINT, KEY_BASE_URL, KEY_ENABLE_THINKING, KEY_EXTRA_BODY, KEY_GOOGLE_API_KEY,
    KEY_PLATFORM,
};
use crate::error::{Error, Result};

/// A defaulted block plus the transport chosen for it.
#[derive(Debug, Clone)]
pub struct PreparedBlock {
    pub block: ConfigBlock,
    pub transport: Transport,
}

/// A block rewritten for one provider, ready for construction.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub kind: ModelKind,
    pub provider: ProviderId,
    pub block: ConfigBlock,
    pub transport: Transport,
}

/// Picks the provider for a prepared block.
pub fn select(kind: ModelKind, block: &ConfigBlock, env: &EnvSettings) -> ProviderId {
    if is_google_aistudio(block) {
        ProviderId::GoogleAiStudio
    } else if block.contains_key(KEY_AZURE_ENDPOINT) || env.azure_endpoint.is_some() {
        ProviderId::Azure
    } else if is_dashscope(block) {
        ProviderId::Dashscope
    } else if kind == ModelKind::Reasoning {
        ProviderId::DeepSeek
    } else {
        ProviderId::OpenAi
    }
}

/// Selects the provider and rewrites the block into its shape.
pub fn transform(
    kind: ModelKind,
    prepared: PreparedBlock,
    env: &EnvSettings,
) -> Result<ProviderRequest> {
    let PreparedBlock {
        mut block,
        transport,
    } = prepared;
    if block.is_empty() {
        return Err(Error::Configuration(format!("no configuration for type {kind}")));
    }

    let provider = select(kind, &block, env);
    match provider {
        ProviderId::GoogleAiStudio => {
            if let Some(key) = block.remove(KEY_API_KEY) {
                block.insert(KEY_GOOGLE_API_KEY.to_string(), key);
            }
            block.remove(KEY_BASE_URL);
            block.remove(KEY_PLATFORM);
        }
        ProviderId::Dashscope => {
            let thinking = kind == ModelKind::Reasoning;
            let mut extra = match block.remove(KEY_EXTRA_BODY) {
                None | Some(Value::Null) => Map::new(),
                Some(Value::Object(extra)) => extra,
                Some(_) => {
                    return Err(Error::Configuration(format!(
                        "{KEY_EXTRA_BODY} for {kind} must be a mapping"
                    )))
                }
            };
            extra.insert(KEY_ENABLE_THINKING.to_string(), Value::Bool(thinking));
            block.insert(KEY_EXTRA_BODY.to_string(), Value::Object(extra));
        }
        ProviderId::DeepSeek => {
            if let Some(base_url) = block.remove(KEY_BASE_URL) {
                block.insert(KEY_API_BASE.to_string(), base_url);
            }
        }
        ProviderId::Azure | ProviderId::OpenAi => {}
    }

    Ok(ProviderRequest {
        kind,
        provider,
        block,
        transport,
    })
}

fn is_google_aistudio(block: &ConfigBlock) -> bool {
    block
        .get(KEY_PLATFORM)
        .and_then(Value::as_str)
        .map(|p| {
            let p = p.to_lowercase();
            GOOGLE_AISTUDIO_PLATFORMS.contains(&p.as_str())
        })
        .unwrap_or(false)
}

fn is_dashscope(block: &ConfigBlock) -> bool {
    block
        .get(KEY_BASE_URL)
        .and_then(Value::as_str)
        .map(|url| url.contains(DASHSCOPE_HOST_MARKER))
        .unwrap_or(false)
}
