//! The constructed chat model handle.
//!
//! [`ChatModel`] wraps a provider wire client behind enum dispatch, keeping
//! provider details out of callers. Handles are immutable once built and
//! are shared as `Arc<ChatModel>` by the client factory.

use super::gemini::GeminiClient;
use super::kind::ProviderId;
use super::openai::OpenAiCompatClient;
use crate::error::Result;
use crate::message::Message;

/// Internal enum wrapping provider-specific clients.
pub(crate) enum ClientKind {
    OpenAi(OpenAiCompatClient),
    Azure(OpenAiCompatClient),
    Dashscope(OpenAiCompatClient),
    DeepSeek(OpenAiCompatClient),
    Gemini(GeminiClient),
}

/// Dispatches an operation across provider-specific clients.
///
/// Matches on [`ClientKind`] and executes the same block for each variant.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::OpenAi($client) => $body,
            ClientKind::Azure($client) => $body,
            ClientKind::Dashscope($client) => $body,
            ClientKind::DeepSeek($client) => $body,
            ClientKind::Gemini($client) => $body,
        }
    };
}

/// A configured chat model ready to handle completion requests.
pub struct ChatModel {
    provider: ProviderId,
    model: String,
    permissive_tls: bool,
    client: ClientKind,
}

impl ChatModel {
    pub(crate) fn new(model: String, permissive_tls: bool, client: ClientKind) -> Self {
        let provider = match &client {
            ClientKind::OpenAi(_) => ProviderId::OpenAi,
            ClientKind::Azure(_) => ProviderId::Azure,
            ClientKind::Dashscope(_) => ProviderId::Dashscope,
            ClientKind::DeepSeek(_) => ProviderId::DeepSeek,
            ClientKind::Gemini(_) => ProviderId::GoogleAiStudio,
        };
        Self {
            provider,
            model,
            permissive_tls,
            client,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether TLS certificate verification is disabled for this client.
    pub fn permissive_tls(&self) -> bool {
        self.permissive_tls
    }

    /// Sends the conversation and returns the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Request`](crate::error::Error::Request) when the
    /// provider call fails after the configured retries.
    pub async fn complete(&self, messages: &[Message]) -> Result<Message> {
        dispatch!(self, |client| client.complete(messages).await)
    }

    #[cfg(test)]
    pub(crate) fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        dispatch!(self, |client| client.request_body(messages))
    }
}

impl std::fmt::Debug for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("permissive_tls", &self.permissive_tls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::openai::Auth;
    use secrecy::SecretString;
    use serde_json::Map;

    #[test]
    fn test_debug_hides_credentials() {
        let client = OpenAiCompatClient {
            provider: ProviderId::DeepSeek,
            http: reqwest::Client::new(),
            url: "https://api.deepseek.com/chat/completions".into(),
            auth: Auth::Bearer(SecretString::from("sk-very-secret".to_string())),
            model: "deepseek-reasoner".into(),
            max_retries: 3,
            body_defaults: Map::new(),
        };
        let model = ChatModel::new("deepseek-reasoner".into(), false, ClientKind::DeepSeek(client));
        let shown = format!("{model:?}");
        assert_eq!(model.provider(), ProviderId::DeepSeek);
        assert!(shown.contains("deepseek-reasoner"));
        assert!(!shown.contains("sk-very-secret"));
    }
}
