use std::fs;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::Tool;

/// The closed set of tools the model may invoke. Lookup happens by name;
/// nothing can be registered after process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Read,
    Write,
    ListDir,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "read" => Some(ToolKind::Read),
            "write" => Some(ToolKind::Write),
            "list_dir" => Some(ToolKind::ListDir),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Read => "read",
            ToolKind::Write => "write",
            ToolKind::ListDir => "list_dir",
        }
    }
}

#[derive(Deserialize)]
struct ReadArgs {
    path: String,
}

#[derive(Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

#[derive(Deserialize)]
struct ListDirArgs {
    path: String,
}

// Arguments are model-supplied JSON; required keys and primitive types are
// checked here, before any handler runs.
fn parse_args<T: DeserializeOwned>(arguments: &Value) -> AgentResult<T> {
    serde_json::from_value(arguments.clone())
        .map_err(|e| AgentError::InvalidParameters(e.to_string()))
}

/// File and directory tools the agent exposes to the model.
///
/// Paths are used exactly as supplied (absolute, or relative to the process
/// working directory) with no sandboxing.
pub struct WorkspaceTools {
    tools: Vec<Tool>,
}

impl WorkspaceTools {
    pub fn new() -> Self {
        let read_tool = Tool::new(
            ToolKind::Read.name(),
            "Read file (absolute file path)",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"}
                },
                "required": ["path"]
            }),
        );

        let write_tool = Tool::new(
            ToolKind::Write.name(),
            "Write content to a file (absolute or relative to cwd)",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"}
                },
                "required": ["path", "content"]
            }),
        );

        let list_dir_tool = Tool::new(
            ToolKind::ListDir.name(),
            "List files and subdirectories in a directory (absolute or relative to cwd)",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"}
                },
                "required": ["path"]
            }),
        );

        Self {
            tools: vec![read_tool, write_tool, list_dir_tool],
        }
    }

    /// Schemas advertised to the model on every request.
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Execute a tool against model-supplied arguments.
    pub fn call(&self, name: &str, arguments: &Value) -> AgentResult<String> {
        let kind =
            ToolKind::from_name(name).ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        match kind {
            ToolKind::Read => {
                let args: ReadArgs = parse_args(arguments)?;
                self.read(&args.path)
            }
            ToolKind::Write => {
                let args: WriteArgs = parse_args(arguments)?;
                self.write(&args.path, &args.content)
            }
            ToolKind::ListDir => {
                let args: ListDirArgs = parse_args(arguments)?;
                self.list_dir(&args.path)
            }
        }
    }

    // Each line keeps its own terminator, so a final unterminated line stays
    // unterminated in the output.
    fn read(&self, path: &str) -> AgentResult<String> {
        let content =
            fs::read_to_string(path).map_err(|e| AgentError::ExecutionError(e.to_string()))?;
        Ok(content
            .split_inclusive('\n')
            .enumerate()
            .map(|(idx, line)| format!("{}| {}", idx, line))
            .collect())
    }

    fn write(&self, path: &str, content: &str) -> AgentResult<String> {
        fs::write(path, content).map_err(|e| AgentError::ExecutionError(e.to_string()))?;
        Ok("File written successfully.".to_string())
    }

    fn list_dir(&self, path: &str) -> AgentResult<String> {
        let entries = fs::read_dir(path).map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| AgentError::ExecutionError(e.to_string()))?;
            let name = entry.file_name().to_string_lossy().to_string();
            names.push((name, entry.path().is_dir()));
        }
        names.sort();

        let lines: Vec<String> = names
            .into_iter()
            .map(|(name, is_dir)| {
                if is_dir {
                    format!("[{}]", name)
                } else {
                    name
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

impl Default for WorkspaceTools {
    fn default() -> Self {
        Self::new()
    }
}
