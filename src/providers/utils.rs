use regex::Regex;
use serde_json::{json, Value};

use super::base::ProviderError;
use super::types::{
    content::{Content, Text, ToolUse},
    message::{Message, Role},
    tool::Tool,
};

/// Convert the internal message history to the wire message array.
pub fn messages_to_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        if message.role == Role::Tool {
            if let Some(tool_result) = message.tool_result() {
                messages_spec.push(json!({
                    "role": "tool",
                    "content": tool_result.output,
                    "tool_call_id": tool_result.tool_use_id
                }));
            }
            continue;
        }

        let mut converted = json!({
            "role": message.role
        });

        for content in &message.content {
            match content {
                Content::Text(Text { text }) => {
                    converted["content"] = json!(text);
                }
                Content::ToolUse(tool_use) => {
                    let sanitized_name = sanitize_function_name(&tool_use.name);
                    let tool_calls = converted
                        .as_object_mut()
                        .unwrap()
                        .entry("tool_calls")
                        .or_insert(json!([]));

                    tool_calls.as_array_mut().unwrap().push(json!({
                        "id": tool_use.id,
                        "type": "function",
                        "function": {
                            "name": sanitized_name,
                            "arguments": tool_use.parameters.to_string(),
                        }
                    }));
                }
                Content::ToolResult(_) => {}
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            messages_spec.push(converted);
        }
    }

    messages_spec
}

/// Convert the advertised tool set to the wire tool specification
pub fn tools_to_spec(tools: &[Tool]) -> Result<Vec<Value>, ProviderError> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ProviderError::Protocol(format!(
                "duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Parse one model turn out of a chat completion response.
///
/// Exactly one choice is required, and the turn may carry at most one tool
/// call; anything else is a protocol violation. A tool call with an invalid
/// function name or unparseable argument JSON is preserved with `is_error`
/// set so the conversation can carry the failure back to the model.
pub fn response_to_message(response: &Value) -> Result<Message, ProviderError> {
    let choices = response
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Protocol("response has no choices array".to_string()))?;
    if choices.len() != 1 {
        return Err(ProviderError::Protocol(format!(
            "expected exactly one choice, got {}",
            choices.len()
        )));
    }

    if let Some(finish_reason) = choices[0].get("finish_reason").and_then(Value::as_str) {
        tracing::debug!(finish_reason, "model turn finished");
    }

    let original = &choices[0]["message"];
    let mut content = Vec::new();

    if let Some(text) = original.get("content").and_then(Value::as_str) {
        content.push(Content::Text(Text {
            text: text.to_string(),
        }));
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(Value::as_array) {
        if tool_calls.len() > 1 {
            return Err(ProviderError::Protocol(format!(
                "expected at most one tool call per turn, got {}",
                tool_calls.len()
            )));
        }
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default()
                .to_string();

            if !is_valid_function_name(&function_name) {
                content.push(Content::ToolUse(ToolUse {
                    id,
                    name: function_name.clone(),
                    parameters: json!(arguments),
                    is_error: true,
                    error_message: Some(format!(
                        "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                        function_name
                    )),
                }));
            } else {
                match serde_json::from_str::<Value>(&arguments) {
                    Ok(params) => {
                        content.push(Content::ToolUse(ToolUse {
                            id,
                            name: function_name,
                            parameters: params,
                            is_error: false,
                            error_message: None,
                        }));
                    }
                    Err(_) => {
                        content.push(Content::ToolUse(ToolUse {
                            id: id.clone(),
                            name: function_name,
                            parameters: json!(arguments),
                            is_error: true,
                            error_message: Some(format!(
                                "Could not interpret tool use parameters for id {}: {}",
                                id, arguments
                            )),
                        }));
                    }
                }
            }
        }
    }

    // A turn with neither text nor a tool call is still a turn
    if content.is_empty() {
        content.push(Content::Text(Text {
            text: String::new(),
        }));
    }

    Message::new(Role::Assistant, content).map_err(|e| ProviderError::Protocol(e.to_string()))
}

fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}
