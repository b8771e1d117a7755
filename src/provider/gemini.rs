//! Google AI Studio (Gemini `generateContent`) wire client.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};

use super::http::post_json;
use super::kind::ProviderId;
use crate::error::{Error, Result};
use crate::message::{Message, Role};

/// Client for the Gemini `generateContent` endpoint.
pub(crate) struct GeminiClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: SecretString,
    pub(crate) model: String,
    pub(crate) max_retries: u32,
    pub(crate) generation_config: Map<String, Value>,
}

impl GeminiClient {
    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub(crate) fn request_body(&self, messages: &[Message]) -> Value {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(Message::text)
            .collect();
        let contents: Vec<Value> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({"role": role, "parts": [{"text": m.text()}]})
            })
            .collect();

        let mut body = json!({ "contents": contents });
        if !system.is_empty() {
            body["systemInstruction"] = json!({"parts": [{"text": system.join("\n\n")}]});
        }
        if !self.generation_config.is_empty() {
            body["generationConfig"] = Value::Object(self.generation_config.clone());
        }
        body
    }

    pub(crate) async fn complete(&self, messages: &[Message]) -> Result<Message> {
        let url = self.url();
        let body = self.request_body(messages);
        let response = post_json(ProviderId::GoogleAiStudio, self.max_retries, || {
            self.http
                .post(&url)
                .header("x-goog-api-key", self.api_key.expose_secret())
                .json(&body)
        })
        .await?;
        parse_response(&response)
    }
}

/// Maps OpenAI-style sampling keys to their `generationConfig` names.
pub(crate) fn generation_config(kwargs: &Map<String, Value>) -> Map<String, Value> {
    kwargs
        .iter()
        .map(|(k, v)| {
            let key = match k.as_str() {
                "max_tokens" | "max_output_tokens" => "maxOutputTokens",
                "top_p" => "topP",
                "top_k" => "topK",
                "stop" => "stopSequences",
                "n" => "candidateCount",
                other => other,
            };
            (key.to_string(), v.clone())
        })
        .collect()
}

/// Joins the first candidate's text parts; parts flagged `thought` become reasoning.
pub(crate) fn parse_response(response: &Value) -> Result<Message> {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Request {
            provider: ProviderId::GoogleAiStudio,
            reason: "response had no candidates".into(),
        })?;

    let mut text = String::new();
    let mut thoughts = String::new();
    for part in parts {
        let Some(t) = part.get("text").and_then(Value::as_str) else {
            continue;
        };
        if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
            thoughts.push_str(t);
        } else {
            text.push_str(t);
        }
    }

    let mut reply = Message::assistant(text);
    reply.reasoning = (!thoughts.is_empty()).then_some(thoughts);
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient {
            http: Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/".into(),
            api_key: SecretString::from("g-key".to_string()),
            model: "gemini-2.5-flash".into(),
            max_retries: 0,
            generation_config: generation_config(
                json!({"temperature": 0.5, "max_tokens": 256}).as_object().unwrap(),
            ),
        }
    }

    #[test]
    fn test_url() {
        assert_eq!(
            client().url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_splits_system_instruction() {
        let body = client().request_body(&[
            Message::system("You are terse."),
            Message::user("hi"),
            Message::assistant("hello"),
        ]);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are terse.");
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn test_parse_response_separates_thoughts() {
        let response = json!({
            "candidates": [{"content": {"parts": [
                {"text": "pondering", "thought": true},
                {"text": "Hello"},
                {"text": " world"}
            ]}}]
        });
        let msg = parse_response(&response).unwrap();
        assert_eq!(msg.text(), "Hello world");
        assert_eq!(msg.reasoning.as_deref(), Some("pondering"));
    }

    #[test]
    fn test_parse_response_without_candidates() {
        assert!(parse_response(&json!({"candidates": []})).is_err());
    }
}
