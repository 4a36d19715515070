use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::content::{Content, ToolResult, ToolUse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A message in the conversation history. Append-only: once pushed onto the
/// history a message is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<Content>,
}

impl Message {
    pub fn new(role: Role, content: Vec<Content>) -> Result<Self> {
        let msg = Self {
            role,
            created: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_secs() as i64,
            content,
        };
        msg.validate()?;
        Ok(msg)
    }

    fn validate(&self) -> Result<()> {
        match self.role {
            Role::User => {
                if !self.has_text() {
                    return Err(anyhow!("User message must include a Text"));
                }
                if self.has_tool_use() || self.has_tool_result() {
                    return Err(anyhow!(
                        "User message does not support ToolUse or ToolResult"
                    ));
                }
            }
            Role::Assistant => {
                if !self.has_text() && !self.has_tool_use() {
                    return Err(anyhow!("Assistant message must include a Text or ToolUse"));
                }
                if self.has_tool_result() {
                    return Err(anyhow!("Assistant message does not support ToolResult"));
                }
            }
            Role::Tool => {
                if self.content.len() != 1 || !self.has_tool_result() {
                    return Err(anyhow!("Tool message must be a single ToolResult"));
                }
            }
        }
        Ok(())
    }

    pub fn user(text: &str) -> Result<Self> {
        Self::new(Role::User, vec![Content::text(text)])
    }

    pub fn assistant(text: &str) -> Result<Self> {
        Self::new(Role::Assistant, vec![Content::text(text)])
    }

    pub fn tool(tool_use_id: &str, output: &str, is_error: bool) -> Result<Self> {
        Self::new(
            Role::Tool,
            vec![Content::ToolResult(ToolResult {
                tool_use_id: tool_use_id.to_string(),
                output: output.to_string(),
                is_error,
            })],
        )
    }

    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The turn's tool call, if any. The transport guarantees at most one.
    pub fn tool_use(&self) -> Option<&ToolUse> {
        self.content.iter().find_map(|content| match content {
            Content::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        })
    }

    pub fn tool_result(&self) -> Option<&ToolResult> {
        self.content.iter().find_map(|content| match content {
            Content::ToolResult(tool_result) => Some(tool_result),
            _ => None,
        })
    }

    fn has_text(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::Text(_)))
    }

    fn has_tool_use(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::ToolUse(_)))
    }

    fn has_tool_result(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, Content::ToolResult(_)))
    }

    pub fn summary(&self) -> String {
        let content_summaries: Vec<String> = self.content.iter().map(|c| c.summary()).collect();
        format!("message:{:?}\n{}", self.role, content_summaries.join("\n"))
    }
}
