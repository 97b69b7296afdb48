//! `InMemoryLeaseManager` — a mutex-guarded in-memory stand-in for a
//! leases table.
//!
//! `claim_stale_executions` holds the mutex for the whole read-then-write
//! span, which is what makes it linearizable: a real backend gets the same
//! guarantee from a single `UPDATE ... RETURNING` under `READ COMMITTED`,
//! but a test double has no transaction to lean on, so the mutex *is* the
//! critical section.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use model::{ExecutionId, TenantId};
use ports::{LeaseManager, PortsError};

struct LeaseRow {
    tenant_id: TenantId,
    owner: Option<String>,
    last_heartbeat_at: Instant,
}

pub struct InMemoryLeaseManager {
    node_id: String,
    rows: Mutex<HashMap<ExecutionId, LeaseRow>>,
}

impl InMemoryLeaseManager {
    pub fn new(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Force `execution_id`'s heartbeat into the past, so a subsequent
    /// sweep considers it stale — used to simulate a crashed owner in
    /// recovery tests without sleeping real wall-clock time.
    pub fn backdate_heartbeat(&self, execution_id: &ExecutionId, age: Duration) {
        if let Some(row) = self.rows.lock().unwrap().get_mut(execution_id) {
            row.last_heartbeat_at = Instant::now() - age;
        }
    }
}

#[async_trait]
impl LeaseManager for InMemoryLeaseManager {
    async fn acquire(&self, tenant_id: &TenantId, execution_id: &ExecutionId) -> Result<(), PortsError> {
        let mut rows = self.rows.lock().unwrap();
        rows.insert(
            *execution_id,
            LeaseRow {
                tenant_id: *tenant_id,
                owner: Some(self.node_id.clone()),
                last_heartbeat_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn release(&self, _tenant_id: &TenantId, execution_id: &ExecutionId) -> Result<(), PortsError> {
        if let Some(row) = self.rows.lock().unwrap().get_mut(execution_id) {
            row.owner = None;
        }
        Ok(())
    }

    async fn update_heartbeats(&self, owned: &[ExecutionId]) -> Result<(), PortsError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Instant::now();
        for id in owned {
            if let Some(row) = rows.get_mut(id) {
                if row.owner.as_deref() == Some(self.node_id.as_str()) {
                    row.last_heartbeat_at = now;
                }
            }
        }
        Ok(())
    }

    async fn claim_stale_executions(
        &self,
        stale_threshold: Duration,
    ) -> Result<Vec<(TenantId, ExecutionId)>, PortsError> {
        let mut rows = self.rows.lock().unwrap();
        let now = Instant::now();
        let mut claimed = Vec::new();
        for (execution_id, row) in rows.iter_mut() {
            let is_stale = row.owner.is_some() && now.duration_since(row.last_heartbeat_at) >= stale_threshold;
            if is_stale {
                row.owner = Some(self.node_id.clone());
                row.last_heartbeat_at = now;
                claimed.push((row.tenant_id, *execution_id));
            }
        }
        Ok(claimed)
    }

    async fn is_active(&self, _tenant_id: &TenantId, execution_id: &ExecutionId) -> Result<bool, PortsError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(execution_id)
            .is_some_and(|row| row.owner.as_deref() == Some(self.node_id.as_str())))
    }

    fn this_node_id(&self) -> &str {
        &self.node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_then_release_deactivates_lease() {
        let manager = InMemoryLeaseManager::new("node-a");
        let tenant_id = TenantId::new();
        let execution_id = ExecutionId::new();

        manager.acquire(&tenant_id, &execution_id).await.unwrap();
        assert!(manager.is_active(&tenant_id, &execution_id).await.unwrap());

        manager.release(&tenant_id, &execution_id).await.unwrap();
        assert!(!manager.is_active(&tenant_id, &execution_id).await.unwrap());
    }

    #[tokio::test]
    async fn stale_lease_is_claimable_after_threshold() {
        let manager = InMemoryLeaseManager::new("node-a");
        let tenant_id = TenantId::new();
        let execution_id = ExecutionId::new();

        manager.acquire(&tenant_id, &execution_id).await.unwrap();
        manager.backdate_heartbeat(&execution_id, Duration::from_secs(120));

        let claimed = manager.claim_stale_executions(Duration::from_secs(60)).await.unwrap();
        assert_eq!(claimed, vec![(tenant_id, execution_id)]);
    }

    #[tokio::test]
    async fn fresh_lease_is_not_claimable() {
        let manager = InMemoryLeaseManager::new("node-a");
        let tenant_id = TenantId::new();
        let execution_id = ExecutionId::new();

        manager.acquire(&tenant_id, &execution_id).await.unwrap();
        let claimed = manager.claim_stale_executions(Duration::from_secs(60)).await.unwrap();
        assert!(claimed.is_empty());
    }

    #[tokio::test]
    async fn concurrent_sweepers_claim_each_execution_exactly_once() {
        let manager = std::sync::Arc::new(InMemoryLeaseManager::new("node-a"));
        let tenant_id = TenantId::new();
        let mut ids = Vec::new();
        for _ in 0..50 {
            let execution_id = ExecutionId::new();
            manager.acquire(&tenant_id, &execution_id).await.unwrap();
            manager.backdate_heartbeat(&execution_id, Duration::from_secs(120));
            ids.push(execution_id);
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.claim_stale_executions(Duration::from_secs(60)).await.unwrap()
            }));
        }

        let mut all_claimed = Vec::new();
        for handle in handles {
            all_claimed.extend(handle.await.unwrap());
        }

        let mut claimed_ids: Vec<ExecutionId> = all_claimed.iter().map(|(_, id)| *id).collect();
        claimed_ids.sort_by_key(|id| id.0);
        let mut unique = claimed_ids.clone();
        unique.dedup();
        assert_eq!(claimed_ids.len(), unique.len(), "no execution id was claimed twice");
        assert_eq!(unique.len(), ids.len());
    }
}
