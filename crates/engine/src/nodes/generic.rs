use async_trait::async_trait;
use model::{Node, NodeResult};

use crate::context::{ExecutionContext, NodeExecutor};

/// Dispatches to whatever `GenericNodeHandler` is registered under the
/// node's free-form `type` tag. This is the extension point for node kinds
/// that don't warrant their own variant in the closed `Node` enum.
pub struct GenericExecutor;

#[async_trait]
impl NodeExecutor for GenericExecutor {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let (type_tag, config) = match node {
            Node::Generic { type_tag, config, .. } => (type_tag, config),
            _ => return NodeResult::failure("generic executor invoked on non-generic node"),
        };

        match ctx.generic_handlers.get(type_tag) {
            Some(handler) => handler.handle(config, ctx).await,
            None => NodeResult::failure(format!("no generic handler registered for type '{type_tag}'")),
        }
    }
}
