//! Centralized constants for modelgate.
//!
//! Configuration keys, provider defaults and environment variable names live
//! here so they can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "modelgate";

/// Configuration filename, looked up in the project tree and the XDG config dir.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "MODELGATE_CONFIG";

/// Environment variable overriding the prompt template root.
pub const PROMPTS_DIR_ENV: &str = "MODELGATE_PROMPTS";

/// Template root shipped with the crate.
pub const DEFAULT_PROMPTS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/prompts");

/// File extension of prompt templates.
pub const TEMPLATE_EXTENSION: &str = "md";

/// Format of the `CURRENT_TIME` template variable.
pub const CURRENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reserved template variable holding the render timestamp.
pub const CURRENT_TIME_VAR: &str = "CURRENT_TIME";

// --- Configuration block keys ---

pub const KEY_API_KEY: &str = "api_key";
pub const KEY_GOOGLE_API_KEY: &str = "google_api_key";
pub const KEY_BASE_URL: &str = "base_url";
pub const KEY_API_BASE: &str = "api_base";
pub const KEY_PLATFORM: &str = "platform";
pub const KEY_AZURE_ENDPOINT: &str = "azure_endpoint";
pub const KEY_VERIFY_SSL: &str = "verify_ssl";
pub const KEY_MAX_RETRIES: &str = "max_retries";
pub const KEY_TOKEN_LIMIT: &str = "token_limit";
pub const KEY_EXTRA_BODY: &str = "extra_body";
pub const KEY_ENABLE_THINKING: &str = "enable_thinking";

// --- Defaulting ---

/// Retry budget applied when a block does not set `max_retries`.
pub const DEFAULT_MAX_RETRIES: u64 = 3;

/// Base delay between retries, multiplied by the attempt number.
pub const RETRY_BACKOFF_MS: u64 = 500;

/// Request timeout when a block does not set `timeout`.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

// --- Provider detection ---

/// Platform tags selecting Google AI Studio.
pub const GOOGLE_AISTUDIO_PLATFORMS: &[&str] = &["google_aistudio", "google-aistudio"];

/// Substring of `base_url` identifying a Dashscope endpoint.
pub const DASHSCOPE_HOST_MARKER: &str = "dashscope.";

// --- Provider endpoints ---

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const AZURE_DEFAULT_API_VERSION: &str = "2024-10-21";

// --- Environment ---

pub const AZURE_ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub const AZURE_API_KEY_ENV: &str = "AZURE_OPENAI_API_KEY";
pub const AZURE_API_VERSION_ENV: &str = "OPENAI_API_VERSION";
pub const SEARCH_API_ENV: &str = "SEARCH_API";

/// Placeholder written in place of secret values.
pub const REDACTED: &str = "***";
