//! The agent core: conversation state, action classification, the approval
//! gate, and the orchestrator turn loop.

mod agent_loop;
mod approval;
mod classify;
mod conversation;
mod prompt;

pub use agent_loop::{Agent, RenderedAction, TurnOutcome, TurnStatus};
pub use approval::{parse_decision, ApprovalDecision};
pub use classify::classify;
pub use conversation::Conversation;
pub use prompt::build_system_prompt;
