//! Engine-level error types.
//!
//! One enum per crate boundary, with `#[from]` conversions composing the
//! layers below it: `Ports`/`Rubric`/`Transition` each fold into
//! `EngineError` so a caller only ever matches on one top-level type.

use thiserror::Error;

use model::NodeId;
use ports::PortsError;

/// Errors produced while scoring a node result against a rubric.
#[derive(Debug, Error)]
pub enum RubricError {
    #[error("rubric '{0}' not found")]
    RubricNotFound(String),
}

/// Errors produced while evaluating a node's transition rules. `Consensus`
/// is parsed as data but has no evaluator, so it always fails closed.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("node '{0}' has no matching transition rule for its result")]
    NoMatchingRule(NodeId),

    #[error("the Consensus transition variant has no evaluator")]
    ConsensusUnimplemented,
}

/// Top-level engine error — surfaces only at the driver boundary: storage
/// or lease failures, or a programming error such as dispatching a node
/// with no registered executor.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no executor registered for node variant '{0}'")]
    NoExecutorForVariant(String),

    #[error("unknown agent id '{0}'")]
    UnknownAgent(String),

    #[error("workflow has no node '{0}'")]
    UnknownNode(NodeId),

    #[error(transparent)]
    Rubric(#[from] RubricError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Ports(#[from] PortsError),

    #[error("checkpoint write failed: {0}")]
    CheckpointFailed(String),
}
