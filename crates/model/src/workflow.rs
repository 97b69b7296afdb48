//! Workflow and node definitions.
//!
//! A tagged-variant node graph: transitions are declared per node (not as a
//! flat edge list), and a node's *variant* determines how it executes, not
//! a free-form `node_type` string dispatched later.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent::AgentBinding;
use crate::error::ModelError;
use crate::ids::{NodeId, NodeRef};
use crate::rubric::Rubric;
use crate::transition::TransitionRule;
use crate::execution::ExitStatus;

/// How child results are combined in a `Parallel`/`ForkJoin` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    AllSucceed,
    AnySucceed,
}

/// Loop termination condition for a `Loop` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopCondition {
    /// Loop until a child sets `state.loopBreakTarget`.
    Always,
    /// Loop while the expression evaluates truthily against context.
    Expression { expression: String },
}

/// Human-review gating mode for a `Standard` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewMode {
    /// Always pause for review after this node executes.
    Required,
    /// Pause for review only when the node result is a failure.
    OptionalOnFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub mode: ReviewMode,
}

/// Actions executed in order by an `Action` node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Dispatch `payload` to a named `ActionHandler`.
    Send {
        handler_id: String,
        payload: serde_json::Value,
    },
    /// Reserved for local modes; must fail in server contexts.
    Execute { command_id: String },
}

impl ActionKind {
    pub fn payload_as_json(&self) -> serde_json::Value {
        match self {
            ActionKind::Send { payload, .. } => payload.clone(),
            ActionKind::Execute { command_id } => serde_json::json!({ "command_id": command_id }),
        }
    }
}

/// One node in a workflow's node map. Variant dispatch, not inheritance: a
/// registry maps each variant's tag to the `NodeExecutor` that knows how to
/// run it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Standard {
        agent_id: String,
        prompt_template: String,
        rubric_id: Option<String>,
        review: Option<ReviewConfig>,
        /// Named output parameters to extract from JSON in the agent output
        /// and merge into context.
        output_params: Vec<String>,
        rules: Vec<TransitionRule>,
    },
    Parallel {
        children: Vec<NodeId>,
        join_policy: JoinPolicy,
        rules: Vec<TransitionRule>,
    },
    ForkJoin {
        children: Vec<NodeId>,
        join_policy: JoinPolicy,
        join_node: NodeId,
        rules: Vec<TransitionRule>,
    },
    Loop {
        body_node: NodeId,
        condition: LoopCondition,
        max_iterations: u32,
        rules: Vec<TransitionRule>,
    },
    Action {
        actions: Vec<ActionKind>,
        rules: Vec<TransitionRule>,
    },
    Generic {
        type_tag: String,
        config: serde_json::Value,
        rules: Vec<TransitionRule>,
    },
    End {
        exit_status: ExitStatus,
    },
}

impl Node {
    /// Transition rules declared on this node, in declaration order. `End`
    /// nodes have none — there is nowhere left to transition to.
    pub fn rules(&self) -> &[TransitionRule] {
        match self {
            Node::Standard { rules, .. }
            | Node::Parallel { rules, .. }
            | Node::ForkJoin { rules, .. }
            | Node::Loop { rules, .. }
            | Node::Action { rules, .. }
            | Node::Generic { rules, .. } => rules,
            Node::End { .. } => &[],
        }
    }

    pub fn variant_tag(&self) -> &'static str {
        match self {
            Node::Standard { .. } => "standard",
            Node::Parallel { .. } => "parallel",
            Node::ForkJoin { .. } => "fork_join",
            Node::Loop { .. } => "loop",
            Node::Action { .. } => "action",
            Node::Generic { .. } => "generic",
            Node::End { .. } => "end",
        }
    }
}

/// An immutable workflow definition, shared read-only across every execution
/// driven from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: crate::ids::WorkflowId,
    pub name: String,
    pub start_node_id: NodeId,
    pub nodes: HashMap<NodeId, Node>,
    pub agent_bindings: Vec<AgentBinding>,
    pub rubrics: Vec<Rubric>,
}

impl Workflow {
    /// Checks the structural invariants of a workflow definition:
    /// `start_node_id` is a key of the node map, and every transition target
    /// referenced by any node is either a node id or the terminal sentinel.
    ///
    /// This does *not* reject cycles: `Loop` bodies and rubric/review
    /// backtracks intentionally revisit nodes, so acyclicity is not an
    /// invariant of this graph.
    pub fn check_invariants(&self) -> Result<(), ModelError> {
        if !self.nodes.contains_key(&self.start_node_id) {
            return Err(ModelError::UnknownNode(self.start_node_id.clone()));
        }

        for (id, node) in &self.nodes {
            let targets = self.referenced_targets(node);
            for target in targets {
                if let NodeRef::Node(target_id) = &target {
                    if !self.nodes.contains_key(target_id) {
                        return Err(ModelError::DanglingTransition {
                            from: id.clone(),
                            to: target_id.clone(),
                        });
                    }
                }
            }
            if let Node::Parallel { children, .. } | Node::ForkJoin { children, .. } = node {
                for child in children {
                    if !self.nodes.contains_key(child) {
                        return Err(ModelError::UnknownNode(child.clone()));
                    }
                }
            }
            if let Node::ForkJoin { join_node, .. } = node {
                if !self.nodes.contains_key(join_node) {
                    return Err(ModelError::UnknownNode(join_node.clone()));
                }
            }
            if let Node::Loop { body_node, .. } = node {
                if !self.nodes.contains_key(body_node) {
                    return Err(ModelError::UnknownNode(body_node.clone()));
                }
            }
        }

        Ok(())
    }

    fn referenced_targets(&self, node: &Node) -> Vec<NodeRef> {
        node.rules().iter().flat_map(|r| r.targets()).collect()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }
}
