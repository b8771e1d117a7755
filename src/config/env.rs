//! Snapshot of environment-level settings.
//!
//! Captured once so provider selection reads a fixed view instead of the
//! live process environment.

use crate::constants::{AZURE_API_KEY_ENV, AZURE_API_VERSION_ENV, AZURE_ENDPOINT_ENV, SEARCH_API_ENV};

use super::resolve::process_env;
use super::search::SearchEngine;

/// Environment values consulted during provider selection and construction.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    /// Azure endpoint used as a fallback selection signal and endpoint.
    pub azure_endpoint: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_api_version: Option<String>,
    pub search_engine: SearchEngine,
}

impl EnvSettings {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(&process_env)
    }

    /// Builds a snapshot from an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            azure_endpoint: get(AZURE_ENDPOINT_ENV),
            azure_api_key: get(AZURE_API_KEY_ENV),
            azure_api_version: get(AZURE_API_VERSION_ENV),
            search_engine: SearchEngine::parse_or_default(get(SEARCH_API_ENV).as_deref()),
        }
    }
}
