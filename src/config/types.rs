//! The loaded configuration document and per-kind block access.

use serde_json::{Map, Value};

use super::kind::ModelKind;
use crate::constants::KEY_TOKEN_LIMIT;
use crate::error::{redact, Error, Result};

/// Configuration scoped to one model kind.
pub type ConfigBlock = Map<String, Value>;

/// A parsed configuration document: top-level keys mapped to nested values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    pub fn new(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// Builds a document from a JSON value. The root must be a mapping.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            Value::Null => Ok(Self::default()),
            other => Err(Error::Configuration(format!(
                "configuration root must be a mapping, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Returns the block bound to `kind`.
    ///
    /// Fails when the key is absent or its value is not a mapping.
    pub fn block(&self, kind: ModelKind) -> Result<&ConfigBlock> {
        match self.root.get(kind.config_key()) {
            Some(Value::Object(block)) => Ok(block),
            Some(other) => Err(Error::Configuration(format!(
                "invalid configuration for {kind}: {} must be a mapping, found {}",
                kind.config_key(),
                type_name(other)
            ))),
            None => Err(Error::Configuration(format!(
                "no configuration for type {kind} (missing {})",
                kind.config_key()
            ))),
        }
    }

    /// Returns `token_limit` for `kind`, or `None` when the block or field is absent.
    pub fn token_limit(&self, kind: ModelKind) -> Result<Option<u64>> {
        let Some(block) = self.root.get(kind.config_key()).and_then(Value::as_object) else {
            return Ok(None);
        };
        match block.get(KEY_TOKEN_LIMIT) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v.as_u64().map(Some).ok_or_else(|| {
                Error::Configuration(format!(
                    "token_limit for {kind} must be a non-negative integer, found {v}"
                ))
            }),
        }
    }

    /// The whole document with credentials masked, for display.
    pub fn redacted(&self) -> Value {
        Value::Object(redact(&self.root))
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        ConfigDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_block_lookup() {
        let d = doc(json!({"BASIC_MODEL": {"model": "gpt-4o"}}));
        assert_eq!(d.block(ModelKind::Basic).unwrap()["model"], "gpt-4o");
    }

    #[test]
    fn test_missing_block_is_configuration_error() {
        let d = doc(json!({"BASIC_MODEL": {"model": "gpt-4o"}}));
        let err = d.block(ModelKind::Vision).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("VISION_MODEL")));
    }

    #[test]
    fn test_non_mapping_block_is_configuration_error() {
        let d = doc(json!({"CODE_MODEL": "gpt-4o"}));
        assert!(matches!(d.block(ModelKind::Code), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_root_must_be_mapping() {
        assert!(ConfigDocument::from_value(json!(["a"])).is_err());
        assert_eq!(ConfigDocument::from_value(Value::Null).unwrap(), ConfigDocument::default());
    }

    #[test]
    fn test_token_limit() {
        let d = doc(json!({
            "BASIC_MODEL": {"model": "m", "token_limit": 128000},
            "CODE_MODEL": {"model": "m", "token_limit": "lots"}
        }));
        assert_eq!(d.token_limit(ModelKind::Basic).unwrap(), Some(128000));
        assert_eq!(d.token_limit(ModelKind::Reasoning).unwrap(), None);
        assert!(d.token_limit(ModelKind::Code).is_err());
    }
}
