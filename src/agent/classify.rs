//! Partition of requested actions into presentation and execution sets.
//!
//! Presentation actions are offered by the frontend renderer for the current
//! request and are forwarded verbatim; everything else runs against the tool
//! registry after approval. On a name collision the presentation side wins:
//! an action the renderer explicitly offers is pre-approved by construction.

use std::collections::HashSet;

use crate::llm::ToolCall;

/// Split `calls` into (presentation, execution), preserving input order
/// within each set.
pub fn classify(
    calls: Vec<ToolCall>,
    frontend_names: &HashSet<String>,
) -> (Vec<ToolCall>, Vec<ToolCall>) {
    calls
        .into_iter()
        .partition(|call| frontend_names.contains(&call.function.name))
}
