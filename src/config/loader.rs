//! Loading configuration documents from YAML files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::paths::find_config;
use super::resolve::{process_env, resolve_value};
use super::types::ConfigDocument;
use crate::error::{Error, Result};

/// Anything that can produce a configuration document.
///
/// Implementations may be called repeatedly; each call returns a fresh document.
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<ConfigDocument>;
}

/// A YAML configuration file on disk.
#[derive(Debug, Clone)]
pub struct YamlFile {
    path: PathBuf,
}

impl YamlFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locates the configuration file via [`find_config`].
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        Ok(Self::new(find_config(explicit)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for YamlFile {
    fn load(&self) -> Result<ConfigDocument> {
        debug!(path = %self.path.display(), "loading configuration");
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            Error::Configuration(format!("failed to read {}: {e}", self.path.display()))
        })?;
        parse_document(&contents, &process_env).map_err(|e| match e {
            Error::Configuration(msg) => {
                Error::Configuration(format!("{}: {msg}", self.path.display()))
            }
            other => other,
        })
    }
}

/// An already-parsed document, handed out as-is.
impl ConfigSource for ConfigDocument {
    fn load(&self) -> Result<ConfigDocument> {
        Ok(self.clone())
    }
}

/// Parses YAML text and substitutes environment placeholders.
pub fn parse_document(
    contents: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<ConfigDocument> {
    if contents.trim().is_empty() {
        return Ok(ConfigDocument::default());
    }
    let mut value: Value = serde_yaml::from_str(contents)
        .map_err(|e| Error::Configuration(format!("invalid YAML: {e}")))?;
    resolve_value(&mut value, lookup);
    ConfigDocument::from_value(value)
}
