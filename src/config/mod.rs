//! Configuration loading for modelgate.
//!
//! The configuration document is YAML with one top-level block per logical
//! model type (`BASIC_MODEL`, `REASONING_MODEL`, ...). String values may
//! reference environment variables as `$VAR` or `{env:VAR}`.

mod env;
mod kind;
mod loader;
mod paths;
mod resolve;
mod search;
mod types;

pub use env::EnvSettings;
pub use kind::{agent_model_kind, ModelKind};
pub use loader::{parse_document, ConfigSource, YamlFile};
pub use paths::{config_dir, find_config};
pub use search::SearchEngine;
pub use types::{ConfigBlock, ConfigDocument};

pub(crate) use types::type_name;
