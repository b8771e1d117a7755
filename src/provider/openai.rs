//! OpenAI chat completions wire client.
//!
//! Serves every provider speaking the OpenAI format (OpenAI itself, Azure
//! deployments, Dashscope compatible mode and DeepSeek); they differ only
//! in endpoint, auth header and extra body fields.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};

use super::http::post_json;
use super::kind::ProviderId;
use crate::error::{Error, Result};
use crate::message::Message;

/// How the API key is sent.
pub(crate) enum Auth {
    /// `Authorization: Bearer <key>`.
    Bearer(SecretString),
    /// `api-key: <key>` (Azure).
    ApiKeyHeader(SecretString),
}

/// Client for an OpenAI-format `chat/completions` endpoint.
pub(crate) struct OpenAiCompatClient {
    pub(crate) provider: ProviderId,
    pub(crate) http: Client,
    /// Full chat completions URL.
    pub(crate) url: String,
    pub(crate) auth: Auth,
    pub(crate) model: String,
    pub(crate) max_retries: u32,
    /// Fields merged into every request body (`extra_body` and model kwargs).
    pub(crate) body_defaults: Map<String, Value>,
}

impl OpenAiCompatClient {
    pub(crate) fn request_body(&self, messages: &[Message]) -> Value {
        let mut body = self.body_defaults.clone();
        body.insert("model".into(), Value::String(self.model.clone()));
        body.insert(
            "messages".into(),
            Value::Array(
                messages
                    .iter()
                    .map(|m| json!({"role": m.role.as_str(), "content": m.text()}))
                    .collect(),
            ),
        );
        Value::Object(body)
    }

    pub(crate) async fn complete(&self, messages: &[Message]) -> Result<Message> {
        let body = self.request_body(messages);
        let response = post_json(self.provider, self.max_retries, || {
            let req = self.http.post(&self.url).json(&body);
            match &self.auth {
                Auth::Bearer(key) => req.bearer_auth(key.expose_secret()),
                Auth::ApiKeyHeader(key) => req.header("api-key", key.expose_secret()),
            }
        })
        .await?;
        parse_response(self.provider, &response)
    }
}

/// Extracts the first choice's message, keeping `reasoning_content` when present.
pub(crate) fn parse_response(provider: ProviderId, response: &Value) -> Result<Message> {
    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| Error::Request {
            provider,
            reason: "response had no choices".into(),
        })?;
    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let mut reply = Message::assistant(content);
    reply.reasoning = message
        .get("reasoning_content")
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
        .map(String::from);
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(defaults: Value) -> OpenAiCompatClient {
        OpenAiCompatClient {
            provider: ProviderId::Dashscope,
            http: Client::new(),
            url: "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions".into(),
            auth: Auth::Bearer(SecretString::from("sk-test".to_string())),
            model: "qwen-plus".into(),
            max_retries: 0,
            body_defaults: defaults.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_request_body_merges_defaults() {
        let c = client(json!({"enable_thinking": false, "temperature": 0.2, "model": "ignored"}));
        let body = c.request_body(&[Message::system("be brief"), Message::user("hi")]);
        assert_eq!(body["model"], "qwen-plus");
        assert_eq!(body["enable_thinking"], false);
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "be brief"}));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_parse_response_with_reasoning() {
        let response = json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": "42",
                "reasoning_content": "thinking..."
            }}]
        });
        let msg = parse_response(ProviderId::DeepSeek, &response).unwrap();
        assert_eq!(msg.text(), "42");
        assert_eq!(msg.reasoning.as_deref(), Some("thinking..."));
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = parse_response(ProviderId::OpenAi, &json!({"choices": []})).unwrap_err();
        assert!(matches!(err, Error::Request { .. }));
    }
}
