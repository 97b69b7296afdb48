//! Transition rule variants.
//!
//! A node carries an ordered list of rules; the transition evaluator in
//! `engine::transition` walks them in declaration order and the first whose
//! condition holds wins.

use serde::{Deserialize, Serialize};

use crate::ids::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOperator {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Range,
}

/// One `(operator, value|range, target)` entry of a `Score` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRule {
    pub operator: ScoreOperator,
    /// The comparison value for all operators except `Range`.
    pub value: Option<f64>,
    /// `(low, high)` inclusive bounds, used only when `operator == Range`.
    pub range: Option<(f64, f64)>,
    pub target: NodeRef,
}

impl ScoreRule {
    pub fn matches(&self, score: f64) -> bool {
        match self.operator {
            ScoreOperator::Gt => self.value.is_some_and(|v| score > v),
            ScoreOperator::Gte => self.value.is_some_and(|v| score >= v),
            ScoreOperator::Lt => self.value.is_some_and(|v| score < v),
            ScoreOperator::Lte => self.value.is_some_and(|v| score <= v),
            ScoreOperator::Eq => self.value.is_some_and(|v| (score - v).abs() < f64::EPSILON),
            ScoreOperator::Range => self
                .range
                .is_some_and(|(lo, hi)| score >= lo && score <= hi),
        }
    }
}

/// Placeholder for the `Consensus` transition variant. Parsed as data but
/// never evaluated — the evaluator fails closed on encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRule {
    pub participants: Vec<String>,
    pub target: NodeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionRule {
    Success { target: NodeRef },
    Failure { retry_count: u32, target: NodeRef },
    Score { rules: Vec<ScoreRule> },
    Consensus(ConsensusRule),
}

impl TransitionRule {
    /// Every node-reachable target this rule can route to, used by
    /// `Workflow::check_invariants` to validate that every transition target
    /// is either a node id or the terminal sentinel.
    pub fn targets(&self) -> Vec<NodeRef> {
        match self {
            TransitionRule::Success { target } => vec![target.clone()],
            TransitionRule::Failure { target, .. } => vec![target.clone()],
            TransitionRule::Score { rules } => rules.iter().map(|r| r.target.clone()).collect(),
            TransitionRule::Consensus(c) => vec![c.target.clone()],
        }
    }
}
