//! Conversation state: the persisted unit of the agent.
//!
//! The transcript is append-only; callers only push messages. The pending
//! execution queue and the awaiting-approval flag move together: either both
//! set (approval outstanding) or both cleared. All mutation goes through
//! `set_pending` / `take_pending` / `clear_pending` so no code path can
//! desynchronize them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm::{ChatMessage, ToolCall};

/// A persisted conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation id (checkpoint key)
    pub id: Uuid,

    /// Append-only transcript; insertion order is the sole ordering key
    pub messages: Vec<ChatMessage>,

    /// Language the assistant should answer in
    pub language: String,

    /// Execution actions awaiting approval; empty unless `awaiting_approval`
    pending_calls: Vec<ToolCall>,

    /// Whether an approval request is outstanding
    awaiting_approval: bool,

    /// When the approval request was issued; used for the optional deadline
    pub pending_since: Option<DateTime<Utc>>,
}

impl Conversation {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            messages: Vec::new(),
            language: "english".to_string(),
            pending_calls: Vec::new(),
            awaiting_approval: false,
            pending_since: None,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn awaiting_approval(&self) -> bool {
        self.awaiting_approval
    }

    pub fn pending_calls(&self) -> &[ToolCall] {
        &self.pending_calls
    }

    /// Park execution calls behind the approval gate. Panics on an empty
    /// queue: an approval request with nothing to approve is a logic error.
    pub fn set_pending(&mut self, calls: Vec<ToolCall>) {
        assert!(!calls.is_empty(), "pending queue must not be empty");
        self.pending_calls = calls;
        self.awaiting_approval = true;
        self.pending_since = Some(Utc::now());
    }

    /// Drain the pending queue and clear the flag in one step. Called on
    /// approval; each drained call is executed exactly once.
    pub fn take_pending(&mut self) -> Vec<ToolCall> {
        self.awaiting_approval = false;
        self.pending_since = None;
        std::mem::take(&mut self.pending_calls)
    }

    /// Discard the pending queue. Called on denial.
    pub fn clear_pending(&mut self) {
        self.pending_calls.clear();
        self.awaiting_approval = false;
        self.pending_since = None;
    }
}
