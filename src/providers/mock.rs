use std::sync::{Arc, Mutex};

use super::base::{Provider, ProviderError, Usage};
use super::types::message::Message;
use super::types::tool::Tool;

/// A provider that replays pre-configured responses, for testing
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Message>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Shared handle to the number of complete() calls made so far
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.calls)
    }
}

impl Provider for MockProvider {
    fn complete(
        &self,
        _model: &str,
        _system: &str,
        _messages: &[Message],
        _tools: &[Tool],
        _max_tokens: Option<i32>,
    ) -> Result<(Message, Usage), ProviderError> {
        *self.calls.lock().unwrap() += 1;
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Return an empty turn if no more pre-configured responses
            let empty =
                Message::assistant("").map_err(|e| ProviderError::Protocol(e.to_string()))?;
            Ok((empty, Usage::default()))
        } else {
            Ok((responses.remove(0), Usage::default()))
        }
    }
}
