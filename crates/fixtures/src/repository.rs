//! In-memory `WorkflowRepository`, `SnapshotRepository`, and
//! `RubricRepository` implementations, tenant-scoped the same way a real
//! backend would be.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use model::{ExecutionId, Rubric, Snapshot, TenantId, Workflow, WorkflowId};
use ports::{PortsError, RubricRepository, SnapshotRepository, WorkflowRepository};

#[derive(Default)]
pub struct InMemoryWorkflowRepository {
    by_tenant: Mutex<HashMap<TenantId, HashMap<WorkflowId, Workflow>>>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn save(&self, tenant_id: &TenantId, workflow: &Workflow) -> Result<(), PortsError> {
        self.by_tenant
            .lock()
            .unwrap()
            .entry(*tenant_id)
            .or_default()
            .insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: &WorkflowId,
    ) -> Result<Option<Workflow>, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .and_then(|m| m.get(id))
            .cloned())
    }

    async fn find_all(&self, tenant_id: &TenantId) -> Result<Vec<Workflow>, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn exists(&self, tenant_id: &TenantId, id: &WorkflowId) -> Result<bool, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .is_some_and(|m| m.contains_key(id)))
    }

    async fn delete(&self, tenant_id: &TenantId, id: &WorkflowId) -> Result<(), PortsError> {
        if let Some(m) = self.by_tenant.lock().unwrap().get_mut(tenant_id) {
            m.remove(id);
        }
        Ok(())
    }

    async fn delete_all_for_tenant(&self, tenant_id: &TenantId) -> Result<(), PortsError> {
        self.by_tenant.lock().unwrap().remove(tenant_id);
        Ok(())
    }

    async fn count(&self, tenant_id: &TenantId) -> Result<usize, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .map(|m| m.len())
            .unwrap_or(0))
    }
}

#[derive(Default)]
pub struct InMemorySnapshotRepository {
    by_tenant: Mutex<HashMap<TenantId, HashMap<ExecutionId, Snapshot>>>,
}

impl InMemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotRepository for InMemorySnapshotRepository {
    async fn save(&self, tenant_id: &TenantId, snapshot: &Snapshot) -> Result<(), PortsError> {
        self.by_tenant
            .lock()
            .unwrap()
            .entry(*tenant_id)
            .or_default()
            .insert(snapshot.execution_id, snapshot.clone());
        Ok(())
    }

    async fn find_by_execution_id(
        &self,
        tenant_id: &TenantId,
        execution_id: &ExecutionId,
    ) -> Result<Option<Snapshot>, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .and_then(|m| m.get(execution_id))
            .cloned())
    }

    async fn find_paused(&self, tenant_id: &TenantId) -> Result<Vec<Snapshot>, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .map(|m| {
                m.values()
                    .filter(|s| !s.current_node_id.is_terminal())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_by_workflow_id(
        &self,
        tenant_id: &TenantId,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<Snapshot>, PortsError> {
        Ok(self
            .by_tenant
            .lock()
            .unwrap()
            .get(tenant_id)
            .map(|m| {
                m.values()
                    .filter(|s| &s.workflow_id == workflow_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, tenant_id: &TenantId, execution_id: &ExecutionId) -> Result<(), PortsError> {
        if let Some(m) = self.by_tenant.lock().unwrap().get_mut(tenant_id) {
            m.remove(execution_id);
        }
        Ok(())
    }

    async fn delete_all_for_tenant(&self, tenant_id: &TenantId) -> Result<(), PortsError> {
        self.by_tenant.lock().unwrap().remove(tenant_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRubricRepository {
    rubrics: Mutex<HashMap<String, Rubric>>,
}

impl InMemoryRubricRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RubricRepository for InMemoryRubricRepository {
    async fn save(&self, rubric: &Rubric) -> Result<(), PortsError> {
        self.rubrics.lock().unwrap().insert(rubric.id.clone(), rubric.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Rubric>, PortsError> {
        Ok(self.rubrics.lock().unwrap().get(id).cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool, PortsError> {
        Ok(self.rubrics.lock().unwrap().contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{ExecutionState, Node, NodeId};

    fn tenant() -> TenantId {
        TenantId::new()
    }

    fn workflow() -> Workflow {
        Workflow {
            id: WorkflowId::new(),
            name: "wf".into(),
            start_node_id: NodeId::new("start"),
            nodes: HashMap::from([(
                NodeId::new("start"),
                Node::End { exit_status: model::ExitStatus::Success },
            )]),
            agent_bindings: vec![],
            rubrics: vec![],
        }
    }

    #[tokio::test]
    async fn save_and_find_round_trips() {
        let repo = InMemoryWorkflowRepository::new();
        let tenant_id = tenant();
        let wf = workflow();
        repo.save(&tenant_id, &wf).await.unwrap();
        let found = repo.find_by_id(&tenant_id, &wf.id).await.unwrap();
        assert_eq!(found.unwrap().id, wf.id);
    }

    #[tokio::test]
    async fn tenants_are_isolated() {
        let repo = InMemoryWorkflowRepository::new();
        let wf = workflow();
        repo.save(&tenant(), &wf).await.unwrap();
        assert!(repo.find_by_id(&tenant(), &wf.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_paused_excludes_terminal_snapshots() {
        let repo = InMemorySnapshotRepository::new();
        let tenant_id = tenant();
        let wf_id = WorkflowId::new();

        let running = ExecutionState::new(ExecutionId::new(), wf_id, NodeId::new("n1"));
        let paused_snapshot = running.snapshot();
        repo.save(&tenant_id, &paused_snapshot).await.unwrap();

        let mut finished = ExecutionState::new(ExecutionId::new(), wf_id, NodeId::new("n1"));
        finished.current_node_id = model::NodeRef::Terminal;
        let done_snapshot = finished.snapshot();
        repo.save(&tenant_id, &done_snapshot).await.unwrap();

        let paused = repo.find_paused(&tenant_id).await.unwrap();
        assert_eq!(paused.len(), 1);
        assert_eq!(paused[0].execution_id, paused_snapshot.execution_id);
    }
}
