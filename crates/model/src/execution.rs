//! Execution state and history.
//!
//! `ExecutionState` is mutable during a run and owned exclusively by the
//! driving executor; `Snapshot` is the immutable, independent deep copy
//! taken at each checkpoint.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ExecutionId, NodeId, NodeRef, WorkflowId};
use crate::rubric::RubricEvaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    Success,
    Failure,
    Pending,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExitStatus {
    Success,
    Failure,
    Cancel,
}

/// The outcome of one node executor invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeResult {
    pub status: NodeStatus,
    pub output: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NodeResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            status: NodeStatus::Success,
            output: Some(output.into()),
            metadata: HashMap::new(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("reason".to_string(), serde_json::json!(reason.into()));
        Self {
            status: NodeStatus::Failure,
            output: None,
            metadata,
        }
    }

    pub fn pending() -> Self {
        Self {
            status: NodeStatus::Pending,
            output: None,
            metadata: HashMap::new(),
        }
    }

    pub fn end(exit_status: ExitStatus) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("exit_status".to_string(), serde_json::json!(exit_status));
        Self {
            status: NodeStatus::End,
            output: None,
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == NodeStatus::Success
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.metadata.get("reason").and_then(|v| v.as_str())
    }
}

/// One entry of the append-only step history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub node_id: NodeId,
    pub result: NodeResult,
    pub timestamp: DateTime<Utc>,
    pub snapshot: Option<Snapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BacktrackType {
    Review,
    RubricFail,
    RetryExhausted,
}

/// One entry of the append-only backtrack event list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktrackEvent {
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub reason: String,
    #[serde(rename = "type")]
    pub kind: BacktrackType,
}

/// Two append-only sequences: steps and backtracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionHistory {
    pub steps: Vec<ExecutionStep>,
    pub backtracks: Vec<BacktrackEvent>,
}

impl ExecutionHistory {
    pub fn push_step(&mut self, step: ExecutionStep) {
        self.steps.push(step);
    }

    pub fn push_backtrack(&mut self, event: BacktrackEvent) {
        self.backtracks.push(event);
    }

    /// The most recent step recorded for `node_id`, if any — used by the
    /// review controller to find a prior-step id to backtrack to.
    pub fn last_step_for(&self, node_id: &NodeId) -> Option<&ExecutionStep> {
        self.steps.iter().rev().find(|s| &s.node_id == node_id)
    }

    /// Invariant: for a backtrack `(from, to)`, `to` must appear in the
    /// step history before `from`'s corresponding step.
    pub fn backtrack_target_precedes_source(&self, event: &BacktrackEvent) -> bool {
        let to_index = self.steps.iter().position(|s| s.node_id == event.to_node_id);
        let from_index = self
            .steps
            .iter()
            .rposition(|s| s.node_id == event.from_node_id);
        matches!((to_index, from_index), (Some(t), Some(f)) if t <= f)
    }

    /// Trim the step history so nothing after `step_id`'s most recent
    /// occurrence remains — used by a `Backtrack` review decision.
    pub fn trim_above(&mut self, node_id: &NodeId) {
        if let Some(pos) = self.steps.iter().rposition(|s| &s.node_id == node_id) {
            self.steps.truncate(pos + 1);
        }
    }
}

/// Mutable per-execution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionState {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub current_node_id: NodeRef,
    pub context: HashMap<String, serde_json::Value>,
    pub history: ExecutionHistory,
    pub rubric_evaluation: Option<RubricEvaluation>,
    pub retry_count: u32,
    pub loop_break_target: Option<NodeRef>,
    /// Set when `current_node_id`'s result is checkpointed and awaiting a
    /// `ReviewHandler` decision; cleared once that decision is applied. A
    /// `Some` here is what lets `resume()` tell a genuine review pause apart
    /// from an ordinary crash-recovery resume of an unfinished node.
    pub pending_review: Option<NodeResult>,
}

impl ExecutionState {
    pub fn new(execution_id: ExecutionId, workflow_id: WorkflowId, start: NodeId) -> Self {
        Self {
            execution_id,
            workflow_id,
            current_node_id: NodeRef::Node(start),
            context: HashMap::new(),
            history: ExecutionHistory::default(),
            rubric_evaluation: None,
            retry_count: 0,
            loop_break_target: None,
            pending_review: None,
        }
    }

    /// An immutable, independently-owned deep copy sufficient to resume the
    /// driver loop. The context map is cloned (not shared by reference) so
    /// the returned snapshot never aliases into the active state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            execution_id: self.execution_id,
            workflow_id: self.workflow_id,
            current_node_id: self.current_node_id.clone(),
            context: self.context.clone(),
            history: self.history.clone(),
            rubric_evaluation: self.rubric_evaluation.clone(),
            retry_count: self.retry_count,
            pending_review: self.pending_review.clone(),
        }
    }

    pub fn restore(snapshot: &Snapshot) -> Self {
        Self {
            execution_id: snapshot.execution_id,
            workflow_id: snapshot.workflow_id,
            current_node_id: snapshot.current_node_id.clone(),
            context: snapshot.context.clone(),
            history: snapshot.history.clone(),
            rubric_evaluation: snapshot.rubric_evaluation.clone(),
            retry_count: snapshot.retry_count,
            loop_break_target: None,
            pending_review: snapshot.pending_review.clone(),
        }
    }
}

/// Wire-stable snapshot shape. No error/throwable objects are ever
/// included; timestamps within `history` are ISO-8601 UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub execution_id: ExecutionId,
    pub workflow_id: WorkflowId,
    pub current_node_id: NodeRef,
    pub context: HashMap<String, serde_json::Value>,
    pub history: ExecutionHistory,
    pub rubric_evaluation: Option<RubricEvaluation>,
    pub retry_count: u32,
    pub pending_review: Option<NodeResult>,
}

// `ExecutionHistory` doesn't derive `PartialEq`: steps carry `DateTime<Utc>`
// timestamps that are volatile across a snapshot round-trip, so equality
// below compares node id, status, and output while ignoring timestamps.
impl PartialEq for ExecutionHistory {
    fn eq(&self, other: &Self) -> bool {
        self.backtracks == other.backtracks
            && self.steps.len() == other.steps.len()
            && self.steps.iter().zip(&other.steps).all(|(a, b)| {
                a.node_id == b.node_id
                    && a.result.status == b.result.status
                    && a.result.output == b.result.output
            })
    }
}

impl PartialEq for ExecutionStep {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id && self.result.status == other.result.status
    }
}

impl PartialEq for BacktrackEvent {
    fn eq(&self, other: &Self) -> bool {
        self.from_node_id == other.from_node_id
            && self.to_node_id == other.to_node_id
            && self.kind == other.kind
    }
}

impl PartialEq for NodeResult {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status && self.output == other.output
    }
}
