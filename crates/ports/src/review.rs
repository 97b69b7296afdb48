//! Human-in-the-loop review capability.

use async_trait::async_trait;
use model::{ExecutionState, Node, NodeId, NodeResult, Workflow};

/// The reviewer's decision for a paused node.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewDecision {
    Approve,
    Backtrack { to_step_id: NodeId },
    Reject { reason: String },
}

/// Gates node completion behind a human decision. The review config lives
/// on the node itself (`Node::Standard.review`), so it is not threaded
/// separately.
#[async_trait]
pub trait ReviewHandler: Send + Sync {
    async fn request_review(
        &self,
        node: &Node,
        result: &NodeResult,
        state: &ExecutionState,
        workflow: &Workflow,
    ) -> ReviewDecision;
}
