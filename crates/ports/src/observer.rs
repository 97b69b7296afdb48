//! `Observer` capability — composable event sink for the
//! driver loop, plan executor, and recovery subsystem.
//!
//! Default (no-op) method bodies let an observer implementation subscribe to
//! only the callbacks it cares about, mirroring the convenience
//! `tracing::instrument` spans give for free at the log layer.

use async_trait::async_trait;
use model::{ExecutionId, NodeId, NodeResult, Snapshot};

#[async_trait]
pub trait Observer: Send + Sync {
    async fn on_node_start(&self, execution_id: &ExecutionId, node_id: &NodeId) {
        let _ = (execution_id, node_id);
    }

    async fn on_node_complete(&self, execution_id: &ExecutionId, node_id: &NodeId, result: &NodeResult) {
        let _ = (execution_id, node_id, result);
    }

    async fn on_agent_start(&self, execution_id: &ExecutionId, agent_id: &str) {
        let _ = (execution_id, agent_id);
    }

    async fn on_agent_complete(&self, execution_id: &ExecutionId, agent_id: &str) {
        let _ = (execution_id, agent_id);
    }

    async fn on_checkpoint(&self, execution_id: &ExecutionId, snapshot: &Snapshot) {
        let _ = (execution_id, snapshot);
    }

    async fn on_planner_start(&self, execution_id: &ExecutionId, node_id: &NodeId) {
        let _ = (execution_id, node_id);
    }

    async fn on_planner_complete(&self, execution_id: &ExecutionId, node_id: &NodeId) {
        let _ = (execution_id, node_id);
    }

    async fn on_execution_paused(&self, execution_id: &ExecutionId, reason: &str) {
        let _ = (execution_id, reason);
    }

    async fn on_execution_completed(&self, execution_id: &ExecutionId, status: model::ExitStatus) {
        let _ = (execution_id, status);
    }
}
