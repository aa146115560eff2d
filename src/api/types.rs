//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::agent::{RenderedAction, TurnStatus};
use crate::llm::{ChatMessage, ToolSchema};

/// Request to post a message to a conversation. `message` carries either a
/// new user message or the reply to an outstanding approval request; it may
/// be omitted to poll a suspended conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// New user message or approval reply
    pub message: Option<String>,

    /// Language preference; sticky once set
    pub language: Option<String>,

    /// Presentation actions the renderer currently offers
    #[serde(default)]
    pub frontend_actions: Vec<ToolSchema>,
}

/// Response after running a turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponseBody {
    /// `done` or `pending_approval`
    pub status: TurnStatus,

    /// Full transcript after the turn
    pub messages: Vec<ChatMessage>,

    /// Presentation actions emitted this turn, in request order
    pub rendered_actions: Vec<RenderedAction>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
