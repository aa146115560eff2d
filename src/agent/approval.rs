//! Human approval gate: prompt rendering and decision parsing.
//!
//! The gate suspends the turn while execution actions are outstanding. The
//! reply is free text, matched case-insensitively against keyword sets; a
//! reply matching both sets (or neither) is unrecognized and re-prompts
//! without touching the pending queue.

use serde_json::Value;

use crate::llm::ToolCall;
use crate::tools::ToolRegistry;

const APPROVE_KEYWORDS: &[&str] = &["approve", "yes", "proceed", "ok", "continue"];
const DENY_KEYWORDS: &[&str] = &["deny", "no", "cancel", "stop"];

/// Outcome of parsing an approval reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Denied,
    Unrecognized,
}

/// Classify a free-text reply against the approve/deny keyword sets.
pub fn parse_decision(reply: &str) -> ApprovalDecision {
    let reply = reply.to_lowercase();
    let approves = APPROVE_KEYWORDS.iter().any(|k| reply.contains(k));
    let denies = DENY_KEYWORDS.iter().any(|k| reply.contains(k));

    match (approves, denies) {
        (true, false) => ApprovalDecision::Approved,
        (false, true) => ApprovalDecision::Denied,
        _ => ApprovalDecision::Unrecognized,
    }
}

/// Build the approval request message: one bullet per pending call, rendered
/// through the registry's per-tool templates, plus reply instructions.
pub fn build_approval_prompt(registry: &ToolRegistry, calls: &[ToolCall]) -> String {
    let bullets: Vec<String> = calls
        .iter()
        .map(|call| {
            let args: Value = call.parsed_arguments();
            format!("- {}", registry.describe_call(&call.function.name, &args))
        })
        .collect();

    format!(
        "I need your approval to run the following:\n\n{}\n\nReply with \"approve\" to proceed or \"deny\" to cancel.",
        bullets.join("\n")
    )
}

/// Message appended when the pending actions are cancelled.
pub const CANCELLATION_MESSAGE: &str =
    "Tool execution cancelled as per your request. How else can I help you?";

/// Message appended when the approval deadline has passed.
pub const EXPIRED_MESSAGE: &str =
    "The approval request expired, so the pending actions were cancelled. Ask again if you still need them.";

/// Message appended when the reply matched neither keyword set.
pub const CLARIFICATION_MESSAGE: &str =
    "I didn't understand your response. Please reply with 'approve' to proceed or 'deny' to cancel.";
