use async_trait::async_trait;
use futures::future::BoxFuture;
use model::{ExecutionState, JoinPolicy, Node, NodeId, NodeResult, NodeStatus};

use crate::context::{ExecutionContext, NodeExecutor};

/// Runs every child of a `Parallel` node to completion through the
/// cooperative executor and merges their context mutations back into the
/// parent in declaration order (earlier child wins on key conflicts).
pub struct ParallelExecutor;

#[async_trait]
impl NodeExecutor for ParallelExecutor {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let (children, join_policy) = match node {
            Node::Parallel { children, join_policy, .. } => (children, *join_policy),
            _ => return NodeResult::failure("parallel executor invoked on non-parallel node"),
        };

        run_children(children, join_policy, ctx).await
    }
}

/// Shared by `Parallel` and `ForkJoin`: dispatch each child node's own
/// executor (looked up by the child node's variant tag) against a cloned
/// state, run them concurrently, then fold results back into the parent.
pub(crate) async fn run_children(
    children: &[NodeId],
    join_policy: JoinPolicy,
    ctx: &mut ExecutionContext<'_>,
) -> NodeResult {
    let mut child_states: Vec<ExecutionState> = children.iter().map(|_| ctx.state.clone()).collect();

    let mut futures: Vec<BoxFuture<'_, NodeResult>> = Vec::with_capacity(children.len());
    for (child_id, child_state) in children.iter().zip(child_states.iter_mut()) {
        let child_node = match ctx.workflow.node(child_id) {
            Some(n) => n,
            None => return NodeResult::failure(format!("parallel node references unknown child '{child_id}'")),
        };
        let executor = match ctx.node_executors.get(child_node.variant_tag()) {
            Some(e) => e,
            None => {
                return NodeResult::failure(format!(
                    "no executor registered for variant '{}'",
                    child_node.variant_tag()
                ))
            }
        };
        let mut child_ctx = ctx.with_state(child_state);
        futures.push(Box::pin(async move { executor.execute(child_node, &mut child_ctx).await }));
    }

    let results = ctx.cooperative.run_all(futures).await;

    // Merge in declaration order: earlier child's context mutation wins a
    // key conflict, so later merges must not overwrite existing keys.
    for child_state in &child_states {
        for (key, value) in &child_state.context {
            ctx.state.context.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    let all_succeeded = results.iter().all(|r| r.status == NodeStatus::Success);
    let any_succeeded = results.iter().any(|r| r.status == NodeStatus::Success);

    let passed = match join_policy {
        JoinPolicy::AllSucceed => all_succeeded,
        JoinPolicy::AnySucceed => any_succeeded,
    };

    if passed {
        let mut result = NodeResult::success("");
        result.metadata.insert(
            "child_count".into(),
            serde_json::json!(results.len()),
        );
        result
    } else {
        NodeResult::failure("parallel join policy not satisfied")
    }
}
