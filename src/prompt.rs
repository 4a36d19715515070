use anyhow::Result;
use cliclack::{input, spinner};
use console::style;

use crate::providers::types::content::Content;
use crate::providers::types::message::Message;

/// Interactive surface for one conversation session.
pub trait Prompt {
    fn render(&mut self, message: &Message);
    fn render_error(&mut self, error: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
}

pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>,
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

pub struct CliclackPrompt {
    spinner: Option<cliclack::ProgressBar>,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt { spinner: None }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print_markdown(content: &str) {
    bat::PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .unwrap();
    println!();
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, message: &Message) {
        for content in &message.content {
            match content {
                Content::Text(text) => {
                    if !text.text.is_empty() {
                        print_markdown(&text.text);
                    }
                }
                Content::ToolUse(tool_use) => {
                    println!(
                        "{}",
                        style(format!(
                            "Calling: {}({})",
                            tool_use.name, tool_use.parameters
                        ))
                        .dim()
                    );
                }
                Content::ToolResult(_) => {}
            }
        }
    }

    fn render_error(&mut self, error: &str) {
        println!("{}", style(error).red());
    }

    fn get_input(&mut self) -> Result<Input> {
        let message_text: String = input(">").placeholder("").interact()?;
        let message_text = message_text.trim().to_string();

        if message_text.is_empty() {
            return Ok(Input {
                input_type: InputType::AskAgain,
                content: None,
            });
        }

        if message_text.eq_ignore_ascii_case("exit")
            || message_text.eq_ignore_ascii_case("/exit")
            || message_text.eq_ignore_ascii_case("/quit")
        {
            return Ok(Input {
                input_type: InputType::Exit,
                content: None,
            });
        }

        Ok(Input {
            input_type: InputType::Message,
            content: Some(message_text),
        })
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("awaiting reply");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }
}
