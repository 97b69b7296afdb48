//! `LeaseManager` capability — the distributed recovery
//! protocol's atomic-claim boundary.
//!
//! `claim_stale_executions` must be linearizable: under concurrent callers,
//! a single execution id is claimed by exactly one of them. A real
//! implementation enforces this with a single
//! `UPDATE ... RETURNING` under `READ COMMITTED`; `fixtures::InMemoryLeaseManager`
//! enforces it with a mutex-guarded compare-and-swap over an in-memory map.

use std::time::Duration;

use async_trait::async_trait;
use model::{ExecutionId, TenantId};

use crate::error::PortsError;

#[async_trait]
pub trait LeaseManager: Send + Sync {
    /// Acquire a lease on `execution_id`, recording this node as the owner.
    async fn acquire(
        &self,
        tenant_id: &TenantId,
        execution_id: &ExecutionId,
    ) -> Result<(), PortsError>;

    /// Release the lease, e.g. at execution termination or a deliberate
    /// pause for human review.
    async fn release(
        &self,
        tenant_id: &TenantId,
        execution_id: &ExecutionId,
    ) -> Result<(), PortsError>;

    /// Bulk-update `last_heartbeat_at = now()` for every execution id this
    /// node currently owns.
    async fn update_heartbeats(&self, owned: &[ExecutionId]) -> Result<(), PortsError>;

    /// Atomically claim every execution whose lease is owned by some node
    /// but hasn't heartbeat within `stale_threshold`. Returns the claimed
    /// execution ids.
    async fn claim_stale_executions(
        &self,
        stale_threshold: Duration,
    ) -> Result<Vec<(TenantId, ExecutionId)>, PortsError>;

    /// Whether `execution_id`'s lease is currently owned by this node.
    async fn is_active(&self, tenant_id: &TenantId, execution_id: &ExecutionId) -> Result<bool, PortsError>;

    /// This node's stable identifier, used as the lease owner value.
    fn this_node_id(&self) -> &str;
}
