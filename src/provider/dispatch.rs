//! Closed mapping from [`ProviderId`] to client constructors.
//!
//! Adding a provider means one [`ProviderId`] variant, one selection rule in
//! [`transform`](super::transform) and one arm in [`connect`].

use secrecy::SecretString;
use tracing::info;

use super::client::{ChatModel, ClientKind};
use super::gemini::{generation_config, GeminiClient};
use super::kind::ProviderId;
use super::openai::{Auth, OpenAiCompatClient};
use super::settings::{
    body_defaults, from_block, require, timeout, AzureSettings, DeepSeekSettings, GoogleSettings,
    OpenAiSettings,
};
use super::transform::ProviderRequest;
use crate::config::EnvSettings;
use crate::constants::{
    AZURE_DEFAULT_API_VERSION, DEEPSEEK_DEFAULT_BASE_URL, GEMINI_DEFAULT_BASE_URL,
    OPENAI_DEFAULT_BASE_URL,
};
use crate::error::{Error, Result};

/// Builds chat models from provider requests.
///
/// The factory calls this once per model kind; tests substitute their own
/// implementation to observe construction.
pub trait Connector: Send + Sync {
    fn connect(&self, request: ProviderRequest, env: &EnvSettings) -> Result<ChatModel>;
}

/// The default connector backed by modelgate's wire clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProviderConnector;

impl Connector for ProviderConnector {
    fn connect(&self, request: ProviderRequest, env: &EnvSettings) -> Result<ChatModel> {
        connect(request, env)
    }
}

/// Constructs the client for `request.provider` from its rewritten block.
pub fn connect(request: ProviderRequest, env: &EnvSettings) -> Result<ChatModel> {
    let model = match request.provider {
        ProviderId::OpenAi => connect_openai(&request, OPENAI_DEFAULT_BASE_URL)
            .map(|(model, c)| (model, ClientKind::OpenAi(c))),
        ProviderId::Dashscope => connect_openai(&request, OPENAI_DEFAULT_BASE_URL)
            .map(|(model, c)| (model, ClientKind::Dashscope(c))),
        ProviderId::DeepSeek => connect_deepseek(&request),
        ProviderId::Azure => connect_azure(&request, env),
        ProviderId::GoogleAiStudio => connect_google(&request),
    };
    let (model, client) = model?;
    info!(
        kind = %request.kind,
        provider = %request.provider,
        model = %model,
        permissive_tls = request.transport.is_permissive(),
        "constructed chat model"
    );
    Ok(ChatModel::new(model, request.transport.is_permissive(), client))
}

fn http_client(request: &ProviderRequest, secs: Option<f64>) -> Result<reqwest::Client> {
    let timeout = timeout(request.provider, &request.block, secs)?;
    request.transport.client(timeout).map_err(|e| {
        Error::construction(request.provider, &request.block, format!("http client: {e}"))
    })
}

fn chat_completions_url(base: &str) -> String {
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

fn secret(value: String) -> SecretString {
    SecretString::from(value)
}

fn connect_openai(
    request: &ProviderRequest,
    default_base: &str,
) -> Result<(String, OpenAiCompatClient)> {
    let (provider, block) = (request.provider, &request.block);
    let s: OpenAiSettings = from_block(provider, block)?;
    let model = require(provider, block, "model", s.model)?;
    let api_key = require(provider, block, "api_key", s.api_key)?;
    let base = s.base_url.unwrap_or_else(|| default_base.to_string());
    let client = OpenAiCompatClient {
        provider,
        http: http_client(request, s.timeout)?,
        url: chat_completions_url(&base),
        auth: Auth::Bearer(secret(api_key)),
        model: model.clone(),
        max_retries: s.max_retries,
        body_defaults: body_defaults(s.model_kwargs, s.extra_body),
    };
    Ok((model, client))
}

fn connect_deepseek(request: &ProviderRequest) -> Result<(String, ClientKind)> {
    let (provider, block) = (request.provider, &request.block);
    let s: DeepSeekSettings = from_block(provider, block)?;
    let model = require(provider, block, "model", s.model)?;
    let api_key = require(provider, block, "api_key", s.api_key)?;
    let base = s
        .api_base
        .unwrap_or_else(|| DEEPSEEK_DEFAULT_BASE_URL.to_string());
    let client = OpenAiCompatClient {
        provider,
        http: http_client(request, s.timeout)?,
        url: chat_completions_url(&base),
        auth: Auth::Bearer(secret(api_key)),
        model: model.clone(),
        max_retries: s.max_retries,
        body_defaults: body_defaults(s.model_kwargs, s.extra_body),
    };
    Ok((model, ClientKind::DeepSeek(client)))
}

fn connect_azure(request: &ProviderRequest, env: &EnvSettings) -> Result<(String, ClientKind)> {
    let (provider, block) = (request.provider, &request.block);
    let s: AzureSettings = from_block(provider, block)?;
    let endpoint = require(
        provider,
        block,
        "azure_endpoint",
        s.azure_endpoint.or_else(|| env.azure_endpoint.clone()),
    )?;
    let api_key = require(
        provider,
        block,
        "api_key",
        s.api_key.or_else(|| env.azure_api_key.clone()),
    )?;
    let deployment = require(provider, block, "model", s.azure_deployment.or(s.model))?;
    let api_version = s
        .api_version
        .or_else(|| env.azure_api_version.clone())
        .unwrap_or_else(|| AZURE_DEFAULT_API_VERSION.to_string());
    let client = OpenAiCompatClient {
        provider,
        http: http_client(request, s.timeout)?,
        url: azure_url(&endpoint, &deployment, &api_version),
        auth: Auth::ApiKeyHeader(secret(api_key)),
        model: deployment.clone(),
        max_retries: s.max_retries,
        body_defaults: body_defaults(s.model_kwargs, s.extra_body),
    };
    Ok((deployment, ClientKind::Azure(client)))
}

fn azure_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/')
    )
}

fn connect_google(request: &ProviderRequest) -> Result<(String, ClientKind)> {
    let (provider, block) = (request.provider, &request.block);
    let s: GoogleSettings = from_block(provider, block)?;
    let model = require(provider, block, "model", s.model)?;
    let api_key = require(provider, block, "google_api_key", s.google_api_key)?;
    let kwargs = body_defaults(s.model_kwargs, None);
    let client = GeminiClient {
        http: http_client(request, s.timeout)?,
        base_url: GEMINI_DEFAULT_BASE_URL.to_string(),
        api_key: secret(api_key),
        model: model.clone(),
        max_retries: s.max_retries,
        generation_config: generation_config(&kwargs),
    };
    Ok((model, ClientKind::Gemini(client)))
}
