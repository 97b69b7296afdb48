use async_trait::async_trait;
use model::{LoopCondition, Node, NodeResult, NodeStatus};

use crate::context::{ExecutionContext, NodeExecutor};

/// Repeatedly dispatches the loop's body node in-process (not through the
/// cooperative executor — iterations are sequential, not fanned out) until
/// a break condition is met or `max_iterations` is exceeded.
pub struct LoopExecutor;

#[async_trait]
impl NodeExecutor for LoopExecutor {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let (body_node_id, condition, max_iterations) = match node {
            Node::Loop {
                body_node,
                condition,
                max_iterations,
                ..
            } => (body_node, condition, *max_iterations),
            _ => return NodeResult::failure("loop executor invoked on non-loop node"),
        };

        let body_node = match ctx.workflow.node(body_node_id) {
            Some(n) => n,
            None => return NodeResult::failure(format!("loop body node '{body_node_id}' not found")),
        };

        let executor = match ctx.node_executors.get(body_node.variant_tag()) {
            Some(e) => e,
            None => {
                return NodeResult::failure(format!(
                    "no executor registered for variant '{}'",
                    body_node.variant_tag()
                ))
            }
        };

        let mut iteration: u64 = 0;
        let mut last_result = NodeResult::success("");

        loop {
            if iteration >= max_iterations as u64 {
                return NodeResult::failure("loop cap exceeded");
            }

            ctx.state
                .context
                .insert("loop_iteration".into(), serde_json::json!(iteration));

            last_result = executor.execute(body_node, ctx).await;
            iteration += 1;

            if last_result.status != NodeStatus::Success {
                return last_result;
            }

            if ctx.state.loop_break_target.is_some() {
                break;
            }

            match condition {
                LoopCondition::Always => {}
                LoopCondition::Expression { expression } => {
                    if !is_truthy(&ctx.state.context, expression) {
                        break;
                    }
                }
            }
        }

        last_result
    }
}

/// Minimal truthiness check: a bare context key name is truthy when present
/// and not `false`/`null`/empty string/zero.
fn is_truthy(context: &std::collections::HashMap<String, serde_json::Value>, expression: &str) -> bool {
    match context.get(expression.trim()) {
        None => false,
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(serde_json::Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(serde_json::Value::Array(a)) => !a.is_empty(),
        Some(serde_json::Value::Object(o)) => !o.is_empty(),
    }
}
