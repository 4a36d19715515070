use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client; // sync calls only, the whole loop blocks per turn
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::base::{Provider, ProviderError, Usage, DEFAULT_MAX_TOKENS};
use super::configs::base::ProviderConfig;
use super::configs::openrouter::OpenRouterProviderConfig;
use super::types::{message::Message, tool::Tool};
use super::utils::{messages_to_spec, response_to_message, tools_to_spec};

pub struct OpenRouterProvider {
    client: Client,
    config: OpenRouterProviderConfig,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        let config = OpenRouterProviderConfig::from_env()?;
        Self::new(config)
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = match data.get("usage") {
            Some(usage) => usage,
            None => return Usage::default(),
        };

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/api/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()?;

        match response.status() {
            StatusCode::OK => Ok(response.json()?),
            status => Err(ProviderError::Server(status.to_string())),
        }
    }
}

impl Provider for OpenRouterProvider {
    fn complete(
        &self,
        model: &str,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> Result<(Message, Usage), ProviderError> {
        let system_message = json!({
            "role": "system",
            "content": system
        });

        let messages_spec = messages_to_spec(messages);
        let tools_spec = if !tools.is_empty() {
            tools_to_spec(tools)?
        } else {
            vec![]
        };

        // The system message goes first and is synthesized fresh per call
        let mut messages_array = vec![system_message];
        messages_array.extend(messages_spec);

        let mut payload = json!({
            "model": model,
            "messages": messages_array,
            "max_tokens": max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if !tools_spec.is_empty() {
            payload
                .as_object_mut()
                .unwrap()
                .insert("tools".to_string(), json!(tools_spec));
        }

        tracing::trace!(payload = %payload, "sending chat completion request");

        let response = self.post(payload)?;

        if let Some(error) = response.get("error") {
            return Err(ProviderError::Server(error.to_string()));
        }

        let message = response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider_for(server: &mockito::ServerGuard) -> OpenRouterProvider {
        OpenRouterProvider::new(OpenRouterProviderConfig::new(
            "test_key".to_string(),
            server.url(),
        ))
        .unwrap()
    }

    #[test]
    fn test_complete_text_response() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/v1/chat/completions")
            .match_header("authorization", "Bearer test_key")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "max_tokens": 8192
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [{
                        "finish_reason": "stop",
                        "message": {"content": "Hello there"}
                    }],
                    "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
                }"#,
            )
            .create();

        let provider = provider_for(&server);
        let message = Message::user("Hi").unwrap();
        let (response, usage) = provider
            .complete("test-model", "You are a coding assistant.", &[message], &[], None)
            .unwrap();

        assert_eq!(response.text(), "Hello there");
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(5));
        assert_eq!(usage.total_tokens, Some(15));
        mock.assert();
    }

    #[test]
    fn test_complete_tool_call_response() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [{
                        "finish_reason": "tool_calls",
                        "message": {
                            "content": "Checking the directory.",
                            "tool_calls": [{
                                "id": "call_7",
                                "function": {"name": "list_dir", "arguments": "{\"path\": \".\"}"}
                            }]
                        }
                    }]
                }"#,
            )
            .create();

        let provider = provider_for(&server);
        let message = Message::user("What files are here?").unwrap();
        let tool = Tool::new(
            "list_dir",
            "List files and subdirectories in a directory",
            json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]}),
        );
        let (response, usage) = provider
            .complete("test-model", "You are a coding assistant.", &[message], &[tool], None)
            .unwrap();

        let tool_use = response.tool_use().unwrap();
        assert_eq!(tool_use.id, "call_7");
        assert_eq!(tool_use.name, "list_dir");
        assert_eq!(response.text(), "Checking the directory.");
        assert!(usage.total_tokens.is_none());
    }

    #[test]
    fn test_complete_two_choices_is_protocol_violation() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "choices": [
                        {"message": {"content": "first"}},
                        {"message": {"content": "second"}}
                    ]
                }"#,
            )
            .create();

        let provider = provider_for(&server);
        let message = Message::user("Hi").unwrap();
        let result = provider.complete("test-model", "system", &[message], &[], None);

        assert!(matches!(result, Err(ProviderError::Protocol(_))));
    }

    #[test]
    fn test_complete_server_error_status() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(503)
            .create();

        let provider = provider_for(&server);
        let message = Message::user("Hi").unwrap();
        let result = provider.complete("test-model", "system", &[message], &[], None);

        assert!(matches!(result, Err(ProviderError::Server(_))));
    }

    #[test]
    fn test_complete_error_body() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "model not available"}}"#)
            .create();

        let provider = provider_for(&server);
        let message = Message::user("Hi").unwrap();
        let result = provider.complete("test-model", "system", &[message], &[], None);

        match result {
            Err(ProviderError::Server(text)) => assert!(text.contains("model not available")),
            other => panic!("expected server error, got {:?}", other.map(|(m, _)| m)),
        }
    }

    #[test]
    fn test_get_usage_calculated_total() {
        let response = json!({
            "usage": {
                "prompt_tokens": 10,
                "completion_tokens": 20
            }
        });

        let usage = OpenRouterProvider::get_usage(&response);
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(20));
        assert_eq!(usage.total_tokens, Some(30));
    }

    #[test]
    fn test_get_usage_missing() {
        let usage = OpenRouterProvider::get_usage(&json!({}));
        assert!(usage.input_tokens.is_none());
        assert!(usage.output_tokens.is_none());
        assert!(usage.total_tokens.is_none());
    }
}
