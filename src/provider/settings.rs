//! Typed per-provider settings, deserialized from a rewritten block.
//!
//! Each struct names the fields its provider understands. Remaining keys
//! (`temperature`, `max_tokens`, ...) land in `model_kwargs` and are forwarded
//! in request bodies.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::kind::ProviderId;
use crate::config::ConfigBlock;
use crate::constants::{
    DEFAULT_MAX_RETRIES, KEY_API_BASE, KEY_AZURE_ENDPOINT, KEY_BASE_URL, KEY_EXTRA_BODY,
    KEY_GOOGLE_API_KEY, KEY_PLATFORM,
};
use crate::error::{Error, Result};

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES as u32
}

/// OpenAI-compatible endpoints (also used for Dashscope).
#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiSettings {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    pub timeout: Option<f64>,
    pub extra_body: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub model_kwargs: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AzureSettings {
    pub model: Option<String>,
    pub azure_deployment: Option<String>,
    pub azure_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    pub timeout: Option<f64>,
    pub extra_body: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub model_kwargs: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GoogleSettings {
    pub model: Option<String>,
    pub google_api_key: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    pub timeout: Option<f64>,
    #[serde(flatten)]
    pub model_kwargs: Map<String, Value>,
}

/// DeepSeek reasoning models; the endpoint lives under `api_base`.
#[derive(Debug, Deserialize)]
pub(crate) struct DeepSeekSettings {
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    pub timeout: Option<f64>,
    pub extra_body: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub model_kwargs: Map<String, Value>,
}

/// Deserializes `block` into `T`, reporting failures as construction errors.
pub(crate) fn from_block<T: DeserializeOwned>(provider: ProviderId, block: &ConfigBlock) -> Result<T> {
    serde_json::from_value(Value::Object(block.clone()))
        .map_err(|e| Error::construction(provider, block, format!("invalid settings: {e}")))
}

/// Returns the value or a construction error naming the missing field.
pub(crate) fn require(
    provider: ProviderId,
    block: &ConfigBlock,
    field: &str,
    value: Option<String>,
) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::construction(provider, block, format!("missing `{field}`")))
}

pub(crate) fn timeout(
    provider: ProviderId,
    block: &ConfigBlock,
    secs: Option<f64>,
) -> Result<Option<Duration>> {
    match secs {
        None => Ok(None),
        Some(s) if s.is_finite() && s > 0.0 => Ok(Some(Duration::from_secs_f64(s))),
        Some(s) => Err(Error::construction(
            provider,
            block,
            format!("timeout must be a positive number of seconds, found {s}"),
        )),
    }
}

/// Keys that configure endpoint selection or auth and are never request
/// parameters, whichever provider the block ended up targeting.
const CONFIG_ONLY_KEYS: &[&str] = &[
    KEY_BASE_URL,
    KEY_API_BASE,
    KEY_AZURE_ENDPOINT,
    "azure_deployment",
    "api_version",
    KEY_PLATFORM,
    KEY_EXTRA_BODY,
    KEY_GOOGLE_API_KEY,
];

/// Builds the fields merged into every request body: model kwargs overlaid
/// with `extra_body`. Config-only keys left over in the kwargs are dropped.
pub(crate) fn body_defaults(
    mut model_kwargs: Map<String, Value>,
    extra_body: Option<Map<String, Value>>,
) -> Map<String, Value> {
    for key in CONFIG_ONLY_KEYS {
        model_kwargs.remove(*key);
    }
    model_kwargs.extend(extra_body.unwrap_or_default());
    model_kwargs
}
