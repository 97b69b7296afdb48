//! Agent binding and agent response types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An immutable binding of an agent id to the role, model, and instructions
/// it plays within one workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentBinding {
    pub agent_id: String,
    pub role: String,
    pub model: String,
    pub instructions: String,
    /// Whether conversation context carries across repeated invocations of
    /// this binding within one execution.
    pub maintain_context: bool,
}

/// What an `Agent::execute` call can return.
///
/// `Error` is transient and reported through this value rather than a Rust
/// `Err` so that node executors can route it through ordinary transition
/// rules instead of unwinding. Error variants are never persisted to a
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentResponse {
    Text {
        content: String,
        metadata: HashMap<String, serde_json::Value>,
    },
    ToolRequest {
        tool_name: String,
        args: serde_json::Value,
        reasoning: Option<String>,
    },
    PlanProposal {
        steps: Vec<crate::plan::PlannedStep>,
        reasoning: Option<String>,
    },
    Error {
        message: String,
    },
}

impl AgentResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, AgentResponse::Error { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AgentResponse::Text { content, .. } => Some(content),
            _ => None,
        }
    }
}
