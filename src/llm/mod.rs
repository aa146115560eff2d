//! Model gateway: chat wire types, the `LlmClient` trait, and backends.
//!
//! The gateway is a black box from the orchestrator's point of view: one call
//! in, one `ChatResponse` out. Parallel tool calls are disabled on every
//! request so dependent actions keep their ordering.

mod client;
pub mod mock;
mod types;

pub use client::OpenAiClient;
pub use types::{ChatMessage, ChatResponse, Role, ToolCall, ToolCallFunction, ToolSchema};

use async_trait::async_trait;

use crate::error::LlmError;

/// A chat-completions backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one model turn over the full transcript with the given toolset.
    /// `tools` is the union of frontend action descriptors and registry
    /// schemas; it may be empty.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> Result<ChatResponse, LlmError>;
}
