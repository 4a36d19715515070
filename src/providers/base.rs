use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::message::Message;
use super::types::tool::Tool;

/// Token ceiling sent with every request unless the caller overrides it.
pub const DEFAULT_MAX_TOKENS: i32 = 8192;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Failures at the chat completion boundary. All of them end the current
/// input cycle; none of them end the process.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network or body-decode failure reaching the endpoint
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with an error status or an error body
    #[error("server error: {0}")]
    Server(String),

    /// The response does not match the expected single-choice,
    /// at-most-one-tool-call shape
    #[error("protocol violation: {0}")]
    Protocol(String),
}

/// Base trait for chat completion providers
pub trait Provider {
    /// Generate the next assistant turn for the given conversation. The
    /// system prompt is prepended to the outgoing message list on every
    /// call and never stored.
    fn complete(
        &self,
        model: &str,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
        max_tokens: Option<i32>,
    ) -> Result<(Message, Usage), ProviderError>;
}
