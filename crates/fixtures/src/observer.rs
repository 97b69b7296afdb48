//! `RecordingObserver` — records every callback it receives in order, so
//! tests can assert on the event sequence a driven execution produced.

use std::sync::Mutex;

use async_trait::async_trait;
use model::{ExecutionId, ExitStatus, NodeId, NodeResult, Snapshot};
use ports::Observer;

/// An observer that discards every callback — useful wherever a caller
/// needs to satisfy the `Observer` bound but doesn't care about events.
pub struct NoopObserver;

impl Observer for NoopObserver {}

#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    NodeStart(NodeId),
    NodeComplete(NodeId, model::NodeStatus),
    AgentStart(String),
    AgentComplete(String),
    Checkpoint,
    PlannerStart(NodeId),
    PlannerComplete(NodeId),
    Paused(String),
    Completed(ExitStatus),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Observer for RecordingObserver {
    async fn on_node_start(&self, _execution_id: &ExecutionId, node_id: &NodeId) {
        self.events.lock().unwrap().push(ObservedEvent::NodeStart(node_id.clone()));
    }

    async fn on_node_complete(&self, _execution_id: &ExecutionId, node_id: &NodeId, result: &NodeResult) {
        self.events
            .lock()
            .unwrap()
            .push(ObservedEvent::NodeComplete(node_id.clone(), result.status));
    }

    async fn on_agent_start(&self, _execution_id: &ExecutionId, agent_id: &str) {
        self.events.lock().unwrap().push(ObservedEvent::AgentStart(agent_id.to_string()));
    }

    async fn on_agent_complete(&self, _execution_id: &ExecutionId, agent_id: &str) {
        self.events.lock().unwrap().push(ObservedEvent::AgentComplete(agent_id.to_string()));
    }

    async fn on_checkpoint(&self, _execution_id: &ExecutionId, _snapshot: &Snapshot) {
        self.events.lock().unwrap().push(ObservedEvent::Checkpoint);
    }

    async fn on_planner_start(&self, _execution_id: &ExecutionId, node_id: &NodeId) {
        self.events.lock().unwrap().push(ObservedEvent::PlannerStart(node_id.clone()));
    }

    async fn on_planner_complete(&self, _execution_id: &ExecutionId, node_id: &NodeId) {
        self.events.lock().unwrap().push(ObservedEvent::PlannerComplete(node_id.clone()));
    }

    async fn on_execution_paused(&self, _execution_id: &ExecutionId, reason: &str) {
        self.events.lock().unwrap().push(ObservedEvent::Paused(reason.to_string()));
    }

    async fn on_execution_completed(&self, _execution_id: &ExecutionId, status: ExitStatus) {
        self.events.lock().unwrap().push(ObservedEvent::Completed(status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_events_in_call_order() {
        let observer = RecordingObserver::new();
        let execution_id = ExecutionId::new();
        let node_id = NodeId::new("n1");

        observer.on_node_start(&execution_id, &node_id).await;
        observer.on_execution_completed(&execution_id, ExitStatus::Success).await;

        assert_eq!(
            observer.events(),
            vec![
                ObservedEvent::NodeStart(node_id),
                ObservedEvent::Completed(ExitStatus::Success),
            ]
        );
    }
}
