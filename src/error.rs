//! Error types for the agent core.
//!
//! Tool failures never appear here: the registry converts them to
//! `{"error": ...}` payloads that flow back into the transcript. Gateway
//! failures are turn-fatal and end up as assistant-authored error messages;
//! store failures abort the current operation without touching previously
//! persisted state.

use thiserror::Error;

/// Failure talking to the language model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure in the conversation checkpoint store.
#[derive(Debug, Error)]
#[error("conversation store error: {0}")]
pub struct StoreError(pub String);
