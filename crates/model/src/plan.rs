//! Plan definitions for the plan-based dynamic step executor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Static,
    LlmGenerated,
}

/// One step of a plan. `is_synthesize` marks the step that composes the
/// final output from accumulated step outputs rather than invoking a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub index: u32,
    pub tool_name: String,
    pub args: serde_json::Value,
    pub description: String,
    pub is_synthesize: bool,
}

/// An immutable plan tied to one node. Revisions produce a new `Plan` with a
/// new id tied to the same node, never mutate the original in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub node_id: crate::ids::NodeId,
    pub source: PlanSource,
    pub steps: Vec<PlannedStep>,
}

impl Plan {
    pub fn non_synthesis_steps(&self) -> impl Iterator<Item = &PlannedStep> {
        self.steps.iter().filter(|s| !s.is_synthesize)
    }

    pub fn synthesis_step(&self) -> Option<&PlannedStep> {
        self.steps.iter().find(|s| s.is_synthesize)
    }
}
