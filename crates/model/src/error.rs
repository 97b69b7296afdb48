//! Model-level error type.
//!
//! One enum per crate boundary, `#[error(...)]` messages that read like log
//! lines.

use thiserror::Error;

use crate::ids::NodeId;

/// Errors produced while constructing or validating a `Workflow`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("workflow references unknown node '{0}'")]
    UnknownNode(NodeId),

    #[error("node '{from}' has a transition targeting unknown node '{to}'")]
    DanglingTransition { from: NodeId, to: NodeId },
}
