//! The orchestrator turn loop.
//!
//! One call to [`Agent::run_turn`] drives a conversation from a new user
//! message (or an approval reply) to either `Done` or `PendingApproval`:
//!
//! - CHAT: call the gateway with a fresh system prompt, the full transcript,
//!   and the union of frontend + registry toolsets; append the assistant
//!   message verbatim.
//! - Zero requested actions end the turn. Presentation actions are forwarded
//!   to the renderer and also end the turn (the frontend applies them and
//!   re-enters). Execution actions park in the pending queue and suspend the
//!   turn at the approval gate.
//! - Resuming with an approval drains the queue, executes each call in
//!   request order (one tool message each), and re-enters CHAT so the model
//!   sees the results.
//!
//! Gateway failures are turn-fatal but not conversation-fatal: they surface
//! as an assistant-authored error message and the turn ends.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::approval::{
    build_approval_prompt, parse_decision, ApprovalDecision, CANCELLATION_MESSAGE,
    CLARIFICATION_MESSAGE, EXPIRED_MESSAGE,
};
use super::classify::classify;
use super::conversation::Conversation;
use super::prompt::build_system_prompt;
use crate::llm::{ChatMessage, LlmClient, ToolSchema};
use crate::tools::ToolRegistry;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// The model produced a final answer; the next user message starts a new turn.
    Done,
    /// Execution actions are parked at the approval gate; the next call must
    /// carry the human's reply.
    PendingApproval,
}

/// A presentation action forwarded to the renderer: name plus parsed
/// arguments. No return value is consumed by the core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedAction {
    pub name: String,
    pub arguments: Value,
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub status: TurnStatus,
    /// Presentation actions emitted this turn, in request order.
    pub rendered: Vec<RenderedAction>,
}

/// The conversational agent. Constructed once at startup with injected
/// dependencies and shared across conversations; holds no per-conversation
/// state.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    max_rounds: usize,
    approval_timeout: Option<Duration>,
}

impl Agent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, max_rounds: usize) -> Self {
        Self {
            llm,
            tools,
            max_rounds,
            approval_timeout: None,
        }
    }

    /// Set a deadline for outstanding approval requests. Replies arriving
    /// later are treated as denials. Default is no deadline.
    pub fn with_approval_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.approval_timeout = timeout;
        self
    }

    /// Run one turn. `user_message` is the new user input, or the approval
    /// reply when the conversation is suspended at the gate; it may be absent
    /// when polling a suspended conversation.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        user_message: Option<&str>,
        frontend_actions: &[ToolSchema],
    ) -> TurnOutcome {
        let mut rendered = Vec::new();

        if conversation.awaiting_approval() {
            match self.resolve_approval(conversation, user_message) {
                GateResolution::Execute(calls) => {
                    for call in &calls {
                        tracing::debug!(
                            "executing approved tool {} (call {})",
                            call.function.name,
                            call.id
                        );
                        let result = self
                            .tools
                            .execute(&call.function.name, call.parsed_arguments())
                            .await;
                        conversation.push(ChatMessage::tool_result(&call.id, result));
                    }
                    // Fall through to CHAT so the model sees the results.
                }
                GateResolution::Finished(status) => {
                    return TurnOutcome { status, rendered };
                }
            }
        } else if let Some(message) = user_message {
            conversation.push(ChatMessage::user(message));
        }

        let frontend_names: HashSet<String> =
            frontend_actions.iter().map(|a| a.name.clone()).collect();

        let mut toolset: Vec<ToolSchema> = frontend_actions.to_vec();
        toolset.extend(self.tools.schemas());

        for round in 0..self.max_rounds {
            tracing::debug!("conversation {} chat round {}", conversation.id, round + 1);

            let system = build_system_prompt(&conversation.language, &self.tools, &frontend_names);
            let mut messages = Vec::with_capacity(conversation.messages.len() + 1);
            messages.push(ChatMessage::system(system));
            messages.extend_from_slice(&conversation.messages);

            let response = match self.llm.chat(&messages, &toolset).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("gateway failure in conversation {}: {}", conversation.id, e);
                    conversation.push(ChatMessage::assistant(format!(
                        "I ran into a problem reaching the language model ({e}). Please try again."
                    )));
                    return TurnOutcome {
                        status: TurnStatus::Done,
                        rendered,
                    };
                }
            };

            conversation.push(ChatMessage {
                role: crate::llm::Role::Assistant,
                content: response.content.clone(),
                tool_calls: if response.tool_calls.is_empty() {
                    None
                } else {
                    Some(response.tool_calls.clone())
                },
                tool_call_id: None,
            });

            if response.tool_calls.is_empty() {
                return TurnOutcome {
                    status: TurnStatus::Done,
                    rendered,
                };
            }

            let (presentation, execution) = classify(response.tool_calls, &frontend_names);

            for action in presentation {
                tracing::debug!("forwarding presentation action {}", action.function.name);
                rendered.push(RenderedAction {
                    name: action.function.name,
                    arguments: serde_json::from_str(&action.function.arguments)
                        .unwrap_or(Value::Null),
                });
            }

            if execution.is_empty() {
                // Presentation-only turn: the renderer applies the actions and
                // the frontend re-enters with the next user message.
                return TurnOutcome {
                    status: TurnStatus::Done,
                    rendered,
                };
            }

            let prompt = build_approval_prompt(&self.tools, &execution);
            conversation.set_pending(execution);
            conversation.push(ChatMessage::assistant(prompt));
            return TurnOutcome {
                status: TurnStatus::PendingApproval,
                rendered,
            };
        }

        tracing::warn!(
            "conversation {} exceeded {} rounds in one turn",
            conversation.id,
            self.max_rounds
        );
        conversation.push(ChatMessage::assistant(format!(
            "I stopped after {} rounds without reaching a final answer. Please continue the conversation to pick up from here.",
            self.max_rounds
        )));
        TurnOutcome {
            status: TurnStatus::Done,
            rendered,
        }
    }

    fn resolve_approval(
        &self,
        conversation: &mut Conversation,
        user_message: Option<&str>,
    ) -> GateResolution {
        let Some(reply) = user_message else {
            // Polling a suspended conversation changes nothing.
            return GateResolution::Finished(TurnStatus::PendingApproval);
        };

        conversation.push(ChatMessage::user(reply));

        if let (Some(timeout), Some(since)) = (self.approval_timeout, conversation.pending_since) {
            let elapsed = Utc::now().signed_duration_since(since);
            if elapsed.num_seconds() >= 0 && elapsed.num_seconds() as u64 >= timeout.as_secs() {
                tracing::debug!("approval deadline passed for conversation {}", conversation.id);
                conversation.clear_pending();
                conversation.push(ChatMessage::assistant(EXPIRED_MESSAGE));
                return GateResolution::Finished(TurnStatus::Done);
            }
        }

        match parse_decision(reply) {
            ApprovalDecision::Approved => GateResolution::Execute(conversation.take_pending()),
            ApprovalDecision::Denied => {
                conversation.clear_pending();
                conversation.push(ChatMessage::assistant(CANCELLATION_MESSAGE));
                GateResolution::Finished(TurnStatus::Done)
            }
            ApprovalDecision::Unrecognized => {
                conversation.push(ChatMessage::assistant(CLARIFICATION_MESSAGE));
                GateResolution::Finished(TurnStatus::PendingApproval)
            }
        }
    }
}

enum GateResolution {
    Execute(Vec<crate::llm::ToolCall>),
    Finished(TurnStatus),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{FailingLlmClient, MockLlmClient};
    use crate::llm::{ChatResponse, Role, ToolCall, ToolCallFunction};
    use crate::tools::CompanyDbSearch;
    use uuid::Uuid;

    fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: ToolCallFunction {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn agent_with_script(script: Vec<ChatResponse>) -> Agent {
        let mut tools = ToolRegistry::new();
        tools.register(CompanyDbSearch);
        Agent::new(Arc::new(MockLlmClient::new(script)), tools, 16)
    }

    fn display_action() -> ToolSchema {
        ToolSchema {
            name: "displayCompanyInfo".to_string(),
            description: "Display a company card".to_string(),
            parameters: serde_json::json!({"type": "object"}),
        }
    }

    fn search_call() -> ToolCall {
        tool_call("call_1", "search_companies_db", r#"{"query":"Apple"}"#)
    }

    #[tokio::test]
    async fn plain_answer_ends_the_turn() {
        // Scenario E: zero requested actions goes straight to Done.
        let agent = agent_with_script(vec![ChatResponse::text("Hello! Ask me about a company.")]);
        let mut conv = Conversation::new(Uuid::new_v4());

        let outcome = agent.run_turn(&mut conv, Some("hi"), &[]).await;

        assert_eq!(outcome.status, TurnStatus::Done);
        assert!(outcome.rendered.is_empty());
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, Role::User);
        assert_eq!(conv.messages[1].role, Role::Assistant);
        assert!(!conv.awaiting_approval());
    }

    #[tokio::test]
    async fn execution_request_suspends_then_approval_executes() {
        // Scenario A: "Show me Apple" requests search_companies_db, the gate
        // suspends, approval runs the tool and re-enters CHAT.
        let agent = agent_with_script(vec![
            ChatResponse::with_tool_calls(None, vec![search_call()]),
            ChatResponse::text("Apple Inc. trades as AAPL."),
        ]);
        let mut conv = Conversation::new(Uuid::new_v4());

        let outcome = agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        assert_eq!(outcome.status, TurnStatus::PendingApproval);
        assert!(conv.awaiting_approval());
        assert_eq!(conv.pending_calls().len(), 1);
        // Transcript: user, assistant tool-call, approval prompt.
        assert_eq!(conv.messages.len(), 3);
        assert!(conv.messages[2]
            .content
            .as_deref()
            .unwrap()
            .contains("Search database for companies matching: 'Apple'"));

        let outcome = agent.run_turn(&mut conv, Some("approve"), &[]).await;
        assert_eq!(outcome.status, TurnStatus::Done);
        assert!(!conv.awaiting_approval());

        // The tool result correlates to the original call id.
        let tool_messages: Vec<_> = conv
            .messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        assert_eq!(tool_messages.len(), 1);
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call_1"));
        let payload: Value =
            serde_json::from_str(tool_messages[0].content.as_deref().unwrap()).unwrap();
        assert_eq!(payload[0]["ticker_symbol"], "AAPL");

        assert_eq!(
            conv.messages.last().unwrap().content.as_deref(),
            Some("Apple Inc. trades as AAPL.")
        );
    }

    #[tokio::test]
    async fn presentation_forwarded_execution_gated() {
        // Scenario B: presentation and execution actions in one turn.
        let agent = agent_with_script(vec![ChatResponse::with_tool_calls(
            None,
            vec![
                tool_call(
                    "call_1",
                    "displayCompanyInfo",
                    r#"{"company":{"name":"Apple Inc."}}"#,
                ),
                tool_call("call_2", "get_company_news", r#"{"company_name":"Apple"}"#),
            ],
        )]);
        let mut conv = Conversation::new(Uuid::new_v4());

        let outcome = agent
            .run_turn(&mut conv, Some("Show me Apple"), &[display_action()])
            .await;

        assert_eq!(outcome.status, TurnStatus::PendingApproval);
        assert_eq!(outcome.rendered.len(), 1);
        assert_eq!(outcome.rendered[0].name, "displayCompanyInfo");
        assert_eq!(
            outcome.rendered[0].arguments["company"]["name"],
            "Apple Inc."
        );
        // Only the execution call is parked.
        assert_eq!(conv.pending_calls().len(), 1);
        assert_eq!(conv.pending_calls()[0].function.name, "get_company_news");
    }

    #[tokio::test]
    async fn presentation_only_turn_is_done() {
        let agent = agent_with_script(vec![ChatResponse::with_tool_calls(
            Some("Here you go.".to_string()),
            vec![tool_call("call_1", "displayCompanyInfo", r#"{"company":{}}"#)],
        )]);
        let mut conv = Conversation::new(Uuid::new_v4());

        let outcome = agent
            .run_turn(&mut conv, Some("Show me Apple"), &[display_action()])
            .await;

        assert_eq!(outcome.status, TurnStatus::Done);
        assert_eq!(outcome.rendered.len(), 1);
        assert!(!conv.awaiting_approval());
    }

    #[tokio::test]
    async fn denial_cancels_pending_queue() {
        // Scenario C: "nope thanks" contains "no" and denies.
        let agent = agent_with_script(vec![ChatResponse::with_tool_calls(
            None,
            vec![search_call()],
        )]);
        let mut conv = Conversation::new(Uuid::new_v4());

        agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        let outcome = agent.run_turn(&mut conv, Some("nope thanks"), &[]).await;

        assert_eq!(outcome.status, TurnStatus::Done);
        assert!(!conv.awaiting_approval());
        assert!(conv.pending_calls().is_empty());
        assert_eq!(
            conv.messages.last().unwrap().content.as_deref(),
            Some(CANCELLATION_MESSAGE)
        );
        // The parked call never executed.
        assert!(conv.messages.iter().all(|m| m.role != Role::Tool));
    }

    #[tokio::test]
    async fn unrecognized_reply_reprompts_and_keeps_queue() {
        // Scenario D plus idempotence: two unclear replies leave the queue
        // byte-identical.
        let agent = agent_with_script(vec![ChatResponse::with_tool_calls(
            None,
            vec![search_call()],
        )]);
        let mut conv = Conversation::new(Uuid::new_v4());

        agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        let queue_before = serde_json::to_string(conv.pending_calls()).unwrap();

        let outcome = agent.run_turn(&mut conv, Some("maybe"), &[]).await;
        assert_eq!(outcome.status, TurnStatus::PendingApproval);
        assert_eq!(
            conv.messages.last().unwrap().content.as_deref(),
            Some(CLARIFICATION_MESSAGE)
        );
        assert_eq!(
            serde_json::to_string(conv.pending_calls()).unwrap(),
            queue_before
        );

        let outcome = agent.run_turn(&mut conv, Some("maybe"), &[]).await;
        assert_eq!(outcome.status, TurnStatus::PendingApproval);
        assert_eq!(
            serde_json::to_string(conv.pending_calls()).unwrap(),
            queue_before
        );
    }

    #[tokio::test]
    async fn polling_without_reply_changes_nothing() {
        let agent = agent_with_script(vec![ChatResponse::with_tool_calls(
            None,
            vec![search_call()],
        )]);
        let mut conv = Conversation::new(Uuid::new_v4());

        agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        let transcript_len = conv.messages.len();

        let outcome = agent.run_turn(&mut conv, None, &[]).await;
        assert_eq!(outcome.status, TurnStatus::PendingApproval);
        assert_eq!(conv.messages.len(), transcript_len);
        assert!(conv.awaiting_approval());
    }

    #[tokio::test]
    async fn transcript_is_append_only_across_rounds() {
        let agent = agent_with_script(vec![
            ChatResponse::with_tool_calls(None, vec![search_call()]),
            ChatResponse::text("Done."),
        ]);
        let mut conv = Conversation::new(Uuid::new_v4());

        agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        let snapshot = conv.messages.clone();

        agent.run_turn(&mut conv, Some("yes"), &[]).await;
        assert!(conv.messages.len() > snapshot.len());
        assert_eq!(&conv.messages[..snapshot.len()], snapshot.as_slice());
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_assistant_message() {
        let mut tools = ToolRegistry::new();
        tools.register(CompanyDbSearch);
        let agent = Agent::new(Arc::new(FailingLlmClient), tools, 16);
        let mut conv = Conversation::new(Uuid::new_v4());

        let outcome = agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;

        assert_eq!(outcome.status, TurnStatus::Done);
        let last = conv.messages.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.as_deref().unwrap().contains("upstream unavailable"));
        // Still resumable: no approval left dangling.
        assert!(!conv.awaiting_approval());
    }

    #[tokio::test]
    async fn round_limit_ends_the_turn() {
        // With max_rounds = 0 the loop body never runs and the limit message
        // is appended immediately.
        let agent = Agent::new(
            Arc::new(MockLlmClient::new(vec![
                ChatResponse::with_tool_calls(None, vec![search_call()]),
                ChatResponse::with_tool_calls(
                    None,
                    vec![tool_call(
                        "call_2",
                        "search_companies_db",
                        r#"{"query":"Tesla"}"#,
                    )],
                ),
            ])),
            {
                let mut tools = ToolRegistry::new();
                tools.register(CompanyDbSearch);
                tools
            },
            0,
        );
        let mut conv = Conversation::new(Uuid::new_v4());

        let outcome = agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        assert_eq!(outcome.status, TurnStatus::Done);
        assert!(conv
            .messages
            .last()
            .unwrap()
            .content
            .as_deref()
            .unwrap()
            .contains("stopped after 0 rounds"));
    }

    #[tokio::test]
    async fn expired_approval_is_denied() {
        let agent = agent_with_script(vec![ChatResponse::with_tool_calls(
            None,
            vec![search_call()],
        )])
        .with_approval_timeout(Some(Duration::from_secs(0)));
        let mut conv = Conversation::new(Uuid::new_v4());

        agent.run_turn(&mut conv, Some("Show me Apple"), &[]).await;
        let outcome = agent.run_turn(&mut conv, Some("approve"), &[]).await;

        assert_eq!(outcome.status, TurnStatus::Done);
        assert!(!conv.awaiting_approval());
        assert_eq!(
            conv.messages.last().unwrap().content.as_deref(),
            Some(EXPIRED_MESSAGE)
        );
        assert!(conv.messages.iter().all(|m| m.role != Role::Tool));
    }

    #[tokio::test]
    async fn system_prompt_not_persisted() {
        let agent = agent_with_script(vec![ChatResponse::text("hello")]);
        let mut conv = Conversation::new(Uuid::new_v4());

        agent.run_turn(&mut conv, Some("hi"), &[]).await;
        assert!(conv.messages.iter().all(|m| m.role != Role::System));
    }
}
