//! Backend tools and the tool registry.
//!
//! Tools implement the [`Tool`] trait (name / description / schema /
//! execute). The registry is built once at startup and is read-only
//! afterwards. Its `execute` never fails past the boundary: unknown names,
//! malformed arguments, and tool failures are all converted to a
//! `{"error": ...}` JSON payload so the model can react — retry a different
//! tool or explain the failure to the user.

mod company_db;
mod research;

pub use company_db::CompanyDbSearch;
pub use research::{
    CompanyComparison, CompanyFinancials, CompanyNews, CompanyResearch, CompanyResearchClient,
};

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::ToolSchema;

/// A backend tool the model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, as exposed to the model.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema for the argument object.
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// One-line human-readable description of a concrete call, shown in the
    /// approval prompt. The default is generic; tools override it with a
    /// template over their key arguments.
    fn describe_call(&self, args: &Value) -> String {
        format!("Execute `{}` with arguments `{}`", self.name(), args)
    }

    /// Execute the tool. The result is conventionally a JSON document.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Name-keyed registry of tools. Built once at process start; registration
/// of a duplicate name is a wiring bug and panics immediately.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            panic!("duplicate tool registration: {name}");
        }
        self.order.push(name.clone());
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Function descriptors for the model, in registration order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolSchema {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    /// Human-readable description of a pending call, for the approval prompt.
    pub fn describe_call(&self, name: &str, args: &Value) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.describe_call(args),
            None => format!("Execute `{name}` with arguments `{args}`"),
        }
    }

    /// Execute a tool by name. Always returns a textual payload: failures
    /// come back as `{"error": "<reason>"}` rather than as an `Err`.
    pub async fn execute(&self, name: &str, args: Value) -> String {
        let Some(tool) = self.tools.get(name) else {
            tracing::warn!("model requested unknown tool: {}", name);
            return error_payload(&format!("Unknown tool: {name}"));
        };

        match tool.execute(args).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("tool {} failed: {}", name, e);
                error_payload(&e.to_string())
            }
        }
    }
}

/// The `{"error": ...}` envelope fed back to the model on any tool failure.
fn error_payload(reason: &str) -> String {
    json!({ "error": reason }).to_string()
}
