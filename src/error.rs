//! Error taxonomy for client resolution and prompt rendering.
//!
//! Library code returns [`Error`]; the CLI layer wraps it in `anyhow`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::REDACTED;
use crate::provider::ProviderId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration document or block.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The logical model type has no configuration-key mapping.
    #[error("unsupported model type: {0}")]
    UnsupportedType(String),

    /// The provider constructor rejected the settings.
    ///
    /// `block` is already redacted and safe to print.
    #[error("failed to construct {provider} client: {reason} (config: {block})")]
    ProviderConstruction {
        provider: ProviderId,
        block: Value,
        reason: String,
    },

    #[error("template '{name}' failed: {reason}")]
    Template { name: String, reason: String },

    /// A chat completion call failed after exhausting retries.
    #[error("{provider} request failed: {reason}")]
    Request { provider: ProviderId, reason: String },
}

impl Error {
    pub(crate) fn construction(
        provider: ProviderId,
        block: &Map<String, Value>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ProviderConstruction {
            provider,
            block: Value::Object(redact(block)),
            reason: reason.into(),
        }
    }

    pub(crate) fn template(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Template {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Whether a configuration key holds a credential.
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key == "key"
        || key == "password"
        || key.ends_with("_key")
        || key.ends_with("_secret")
        || key.ends_with("_token")
}

/// Returns a copy of `block` with every credential value replaced, recursing
/// into nested maps and lists.
pub fn redact(block: &Map<String, Value>) -> Map<String, Value> {
    block
        .iter()
        .map(|(k, v)| {
            let v = if is_secret_key(k) {
                Value::String(REDACTED.to_string())
            } else {
                redact_value(v)
            };
            (k.clone(), v)
        })
        .collect()
}

fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(inner) => Value::Object(redact(inner)),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_descends_into_lists() {
        let block = json!({
            "fallbacks": [
                {"model": "gpt-4o", "api_key": "sk-listed"},
                [{"auth_token": "t-nested"}],
                "plain"
            ]
        });
        let redacted = Value::Object(redact(block.as_object().unwrap()));
        assert_eq!(
            redacted,
            json!({
                "fallbacks": [
                    {"model": "gpt-4o", "api_key": "***"},
                    [{"auth_token": "***"}],
                    "plain"
                ]
            })
        );
    }

    #[test]
    fn test_redact_hides_keys() {
        let block = json!({
            "api_key": "sk-live",
            "google_api_key": "g-live",
            "model": "gpt-4o",
            "max_tokens": 1024,
            "extra_body": {"access_token": "t", "enable_thinking": true}
        });
        let redacted = redact(block.as_object().unwrap());
        assert_eq!(redacted["api_key"], REDACTED);
        assert_eq!(redacted["google_api_key"], REDACTED);
        assert_eq!(redacted["model"], "gpt-4o");
        assert_eq!(redacted["max_tokens"], 1024);
        assert_eq!(redacted["extra_body"]["access_token"], REDACTED);
        assert_eq!(redacted["extra_body"]["enable_thinking"], true);
    }

    #[test]
    fn test_construction_error_never_prints_secret() {
        let block = json!({"api_key": "sk-very-secret", "model": "m"});
        let err = Error::construction(ProviderId::OpenAi, block.as_object().unwrap(), "boom");
        let msg = err.to_string();
        assert!(!msg.contains("sk-very-secret"));
        assert!(msg.contains("boom"));
        assert!(msg.contains("openai"));
    }
}
