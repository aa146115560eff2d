//! Scripted mock LLM client for tests.
//!
//! Responses are queued up front and popped one per `chat` call, letting
//! tests drive the orchestrator through multi-round turns without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, ChatResponse, LlmClient, ToolSchema};
use crate::error::LlmError;

/// Mock client replaying a fixed script of responses.
#[derive(Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<ChatResponse>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlmClient {
    pub fn new(script: Vec<ChatResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Transcripts received so far, one per `chat` call.
    pub fn recorded_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> Result<ChatResponse, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::Request("mock script exhausted".to_string()))
    }
}

/// Mock client that always fails, for turn-fatal error paths.
pub struct FailingLlmClient;

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn chat(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> Result<ChatResponse, LlmError> {
        Err(LlmError::Request("upstream unavailable".to_string()))
    }
}
