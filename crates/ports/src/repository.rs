//! Storage capabilities. The core never persists bytes itself;
//! these traits are the narrow interface it talks through.

use async_trait::async_trait;
use model::{ExecutionId, Rubric, Snapshot, TenantId, Workflow, WorkflowId};

use crate::error::PortsError;

#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn save(&self, tenant_id: &TenantId, workflow: &Workflow) -> Result<(), PortsError>;
    async fn find_by_id(
        &self,
        tenant_id: &TenantId,
        id: &WorkflowId,
    ) -> Result<Option<Workflow>, PortsError>;
    async fn find_all(&self, tenant_id: &TenantId) -> Result<Vec<Workflow>, PortsError>;
    async fn exists(&self, tenant_id: &TenantId, id: &WorkflowId) -> Result<bool, PortsError>;
    async fn delete(&self, tenant_id: &TenantId, id: &WorkflowId) -> Result<(), PortsError>;
    async fn delete_all_for_tenant(&self, tenant_id: &TenantId) -> Result<(), PortsError>;
    async fn count(&self, tenant_id: &TenantId) -> Result<usize, PortsError>;
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    async fn save(&self, tenant_id: &TenantId, snapshot: &Snapshot) -> Result<(), PortsError>;
    async fn find_by_execution_id(
        &self,
        tenant_id: &TenantId,
        execution_id: &ExecutionId,
    ) -> Result<Option<Snapshot>, PortsError>;
    /// Snapshots whose `current_node_id` is not the terminal sentinel —
    /// i.e. executions awaiting review or otherwise not yet finished.
    async fn find_paused(&self, tenant_id: &TenantId) -> Result<Vec<Snapshot>, PortsError>;
    async fn find_by_workflow_id(
        &self,
        tenant_id: &TenantId,
        workflow_id: &WorkflowId,
    ) -> Result<Vec<Snapshot>, PortsError>;
    async fn delete(&self, tenant_id: &TenantId, execution_id: &ExecutionId) -> Result<(), PortsError>;
    async fn delete_all_for_tenant(&self, tenant_id: &TenantId) -> Result<(), PortsError>;
}

#[async_trait]
pub trait RubricRepository: Send + Sync {
    async fn save(&self, rubric: &Rubric) -> Result<(), PortsError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Rubric>, PortsError>;
    async fn exists(&self, id: &str) -> Result<bool, PortsError>;
}
