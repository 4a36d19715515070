use anyhow::Result;

use crate::prompt::{InputType, Prompt};
use crate::providers::base::Provider;
use crate::providers::types::content::ToolUse;
use crate::providers::types::message::Message;
use crate::workspace::WorkspaceTools;

/// An interactive conversation between the human, the model, and the
/// workspace tools. The session is the single owner of the message history;
/// nothing else appends to it or mutates it.
pub struct Session<'a> {
    provider: Box<dyn Provider>,
    prompt: Box<dyn Prompt + 'a>,
    tools: WorkspaceTools,
    model: String,
    messages: Vec<Message>,
}

impl<'a> Session<'a> {
    pub fn new(provider: Box<dyn Provider>, prompt: Box<dyn Prompt + 'a>, model: String) -> Self {
        Session {
            provider,
            prompt,
            tools: WorkspaceTools::new(),
            model,
            messages: Vec::new(),
        }
    }

    /// Message history so far, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Run the prompt loop until the user exits. Interrupted input ends the
    /// session cleanly.
    pub fn start(&mut self) -> Result<()> {
        loop {
            let input = match self.prompt.get_input() {
                Ok(input) => input,
                Err(_) => break,
            };
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        if content.trim().is_empty() {
                            continue;
                        }
                        self.process_message(content)?;
                    }
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }
        }
        Ok(())
    }

    /// Drive one input cycle: call the model until a turn arrives with no
    /// tool call, then hand control back to the prompt. Exactly one model
    /// call happens per traversal of the inner loop.
    pub fn process_message(&mut self, text: &str) -> Result<()> {
        self.messages.push(Message::user(text)?);

        loop {
            self.prompt.show_busy();
            let result = self.provider.complete(
                &self.model,
                &system_prompt(),
                &self.messages,
                self.tools.tools(),
                None,
            );
            self.prompt.hide_busy();

            let (response, usage) = match result {
                Ok(reply) => reply,
                Err(e) => {
                    // Fatal to this input cycle only; the pending user
                    // message stays in history and the human can retry.
                    tracing::error!(error = %e, "model call failed");
                    self.prompt.render_error(&e.to_string());
                    return Ok(());
                }
            };
            tracing::debug!(
                input_tokens = ?usage.input_tokens,
                output_tokens = ?usage.output_tokens,
                "completed model call"
            );
            tracing::trace!(turn = %response.summary(), "model turn");

            self.prompt.render(&response);
            let tool_use = response.tool_use().cloned();
            self.messages.push(response);

            let Some(tool_use) = tool_use else {
                return Ok(());
            };

            let (output, is_error) = self.dispatch(&tool_use);
            self.messages
                .push(Message::tool(&tool_use.id, &output, is_error)?);
        }
    }

    // Failure containment boundary: every tool failure becomes result text
    // the model can react to. Nothing propagates past here.
    fn dispatch(&self, tool_use: &ToolUse) -> (String, bool) {
        if tool_use.is_error {
            let reason = tool_use
                .error_message
                .as_deref()
                .unwrap_or("malformed tool call");
            return (format!("error: {}", reason), true);
        }
        match self.tools.call(&tool_use.name, &tool_use.parameters) {
            Ok(output) => (output, false),
            Err(e) => (format!("error: {}", e), true),
        }
    }
}

fn system_prompt() -> String {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| ".".to_string());
    format!("Concise coding assistant. cwd: {}", cwd)
}
