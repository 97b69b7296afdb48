use async_trait::async_trait;
use model::{ActionKind, Node, NodeResult};

use crate::context::{ExecutionContext, NodeExecutor};
use crate::template;

/// Executes each of an `Action` node's actions in order via the registered
/// `ActionHandler`s. `Execute(commandId)` is reserved for local/offline
/// modes and always fails here — this engine only runs in server contexts.
pub struct ActionExecutor;

#[async_trait]
impl NodeExecutor for ActionExecutor {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let actions = match node {
            Node::Action { actions, .. } => actions,
            _ => return NodeResult::failure("action executor invoked on non-action node"),
        };

        let mut outputs = Vec::with_capacity(actions.len());

        for action in actions {
            match action {
                ActionKind::Send { handler_id, payload } => {
                    let handler = match ctx.action_handlers.get(handler_id) {
                        Some(h) => h,
                        None => {
                            return NodeResult::failure(format!("unknown action handler '{handler_id}'"))
                        }
                    };
                    let resolved = template::resolve_value(payload, &ctx.state.context);
                    match handler.execute(resolved, &ctx.state.context).await {
                        Ok(result) => outputs.push(result.output),
                        Err(err) => return NodeResult::failure(err.to_string()),
                    }
                }
                ActionKind::Execute { command_id } => {
                    return NodeResult::failure(format!(
                        "Execute(commandId='{command_id}') is not supported outside local mode"
                    ));
                }
            }
        }

        let mut result = NodeResult::success(serde_json::to_string(&outputs).unwrap_or_default());
        result.metadata.insert("action_outputs".into(), serde_json::json!(outputs));
        result
    }
}
