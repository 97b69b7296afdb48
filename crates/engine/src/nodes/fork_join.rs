use async_trait::async_trait;
use model::{Node, NodeResult};

use crate::context::{ExecutionContext, NodeExecutor};
use crate::nodes::parallel::run_children;

/// Like `Parallel`, but the join is an explicit node the driver transitions
/// to afterward rather than a result the executor resolves itself: this
/// executor always returns `PENDING` on success, and the driver routes to
/// `join_node` directly rather than evaluating transition rules (see
/// `workflow_executor`'s special-cased handling of `Node::ForkJoin`).
pub struct ForkJoinExecutor;

#[async_trait]
impl NodeExecutor for ForkJoinExecutor {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let (children, join_policy, join_node) = match node {
            Node::ForkJoin {
                children,
                join_policy,
                join_node,
                ..
            } => (children, *join_policy, join_node),
            _ => return NodeResult::failure("fork_join executor invoked on non-fork-join node"),
        };

        let joined = run_children(children, join_policy, ctx).await;
        if !joined.is_success() {
            return joined;
        }

        let mut result = NodeResult::pending();
        result.metadata = joined.metadata;
        result
            .metadata
            .insert("join_node".into(), serde_json::json!(join_node.to_string()));
        result
    }
}
