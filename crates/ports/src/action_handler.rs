//! `ActionHandler` capability, used by `Action` nodes.

use async_trait::async_trait;

use crate::error::PortsError;

#[derive(Debug, Clone)]
pub struct ActionResult {
    pub output: serde_json::Value,
}

/// A server-side handler registered under a stable `handler_id`. An
/// `Action` node's `Send(handlerId, payload)` dispatches to whichever
/// handler is registered under that id.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn handler_id(&self) -> &str;

    async fn execute(
        &self,
        payload: serde_json::Value,
        context: &std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<ActionResult, PortsError>;
}
