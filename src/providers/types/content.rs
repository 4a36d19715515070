use serde::{Deserialize, Serialize};
use serde_json::Value;

// Text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

// A model-issued request to run a tool. Malformed requests (bad function
// name, unparseable argument JSON) are carried with `is_error` set so the
// failure can flow back to the model as a tool result instead of ending the
// turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub parameters: Value,
    #[serde(default)]
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

// The textual outcome of one tool call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_use_id: String,
    pub output: String,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    Text(Text),
    ToolUse(ToolUse),
    ToolResult(ToolResult),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(Text { text: text.into() })
    }

    pub fn summary(&self) -> String {
        match self {
            Content::Text(t) => format!("content:text\n{}", t.text),
            Content::ToolUse(t) => format!(
                "content:tool_use:{}\nparameters:{}",
                t.name,
                serde_json::to_string(&t.parameters).unwrap_or_default()
            ),
            Content::ToolResult(t) => format!(
                "content:tool_result:error={}\noutput:{}",
                t.is_error, t.output
            ),
        }
    }
}
