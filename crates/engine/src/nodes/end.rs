use async_trait::async_trait;
use model::{Node, NodeResult};

use crate::context::{ExecutionContext, NodeExecutor};

/// Terminal node: carries only an exit status, nothing to dispatch.
pub struct EndExecutor;

#[async_trait]
impl NodeExecutor for EndExecutor {
    async fn execute(&self, node: &Node, _ctx: &mut ExecutionContext<'_>) -> NodeResult {
        match node {
            Node::End { exit_status } => NodeResult::end(*exit_status),
            _ => NodeResult::failure("end executor invoked on non-end node"),
        }
    }
}
