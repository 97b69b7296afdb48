//! Crash recovery: lease heartbeats and the sweeper that reclaims
//! executions abandoned by a node that stopped heartbeating.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use ports::LeaseManager;

use crate::config::EngineConfig;

/// Runs `lease_manager.update_heartbeats` for every execution id this node
/// currently owns, on a fixed interval, until cancelled.
#[instrument(skip_all)]
pub async fn run_heartbeat_job(lease_manager: Arc<dyn LeaseManager>, owned: Arc<tokio::sync::Mutex<Vec<model::ExecutionId>>>, config: EngineConfig) {
    let mut ticker = tokio::time::interval(config.heartbeat_interval);
    loop {
        ticker.tick().await;
        let ids = owned.lock().await.clone();
        if ids.is_empty() {
            continue;
        }
        if let Err(err) = lease_manager.update_heartbeats(&ids).await {
            warn!(error = %err, "heartbeat update failed");
        }
    }
}

/// Outcome of one sweep: the executions claimed for resumption on this node.
#[derive(Debug, Default)]
pub struct SweepResult {
    pub claimed: Vec<(model::TenantId, model::ExecutionId)>,
}

/// One sweeper pass: atomically claim every execution whose lease has gone
/// stale, so it can be resumed by this node. Idempotent and safe to call
/// repeatedly — `claim_stale_executions` is the linearizable boundary that
/// guarantees at most one node ends up owning a given execution.
#[instrument(skip_all)]
pub async fn sweep_once(lease_manager: &dyn LeaseManager, config: &EngineConfig) -> Result<SweepResult, ports::PortsError> {
    let claimed = lease_manager
        .claim_stale_executions(config.lease_stale_threshold)
        .await?;
    if !claimed.is_empty() {
        info!(count = claimed.len(), node = lease_manager.this_node_id(), "claimed stale executions");
    }
    Ok(SweepResult { claimed })
}

/// Runs `sweep_once` on a fixed interval until cancelled, invoking `on_claim`
/// for every execution claimed so the caller can resume it (typically via
/// `workflow_executor::Engine::resume` after loading its snapshot).
#[instrument(skip_all)]
pub async fn run_sweeper_job<F, Fut>(lease_manager: Arc<dyn LeaseManager>, config: EngineConfig, on_claim: F)
where
    F: Fn(model::TenantId, model::ExecutionId) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(config.sweep_interval);
    loop {
        ticker.tick().await;
        match sweep_once(lease_manager.as_ref(), &config).await {
            Ok(result) => {
                for (tenant_id, execution_id) in result.claimed {
                    on_claim(tenant_id, execution_id).await;
                }
            }
            Err(err) => warn!(error = %err, "sweep pass failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use model::TenantId;
    use std::sync::Mutex as StdMutex;

    struct FakeLeaseManager {
        stale: StdMutex<Vec<(TenantId, model::ExecutionId)>>,
        heartbeats_seen: StdMutex<Vec<model::ExecutionId>>,
    }

    #[async_trait]
    impl LeaseManager for FakeLeaseManager {
        async fn acquire(&self, _tenant_id: &TenantId, _execution_id: &model::ExecutionId) -> Result<(), ports::PortsError> {
            Ok(())
        }

        async fn release(&self, _tenant_id: &TenantId, _execution_id: &model::ExecutionId) -> Result<(), ports::PortsError> {
            Ok(())
        }

        async fn update_heartbeats(&self, owned: &[model::ExecutionId]) -> Result<(), ports::PortsError> {
            self.heartbeats_seen.lock().unwrap().extend_from_slice(owned);
            Ok(())
        }

        async fn claim_stale_executions(&self, _stale_threshold: Duration) -> Result<Vec<(TenantId, model::ExecutionId)>, ports::PortsError> {
            Ok(std::mem::take(&mut *self.stale.lock().unwrap()))
        }

        async fn is_active(&self, _tenant_id: &TenantId, _execution_id: &model::ExecutionId) -> Result<bool, ports::PortsError> {
            Ok(true)
        }

        fn this_node_id(&self) -> &str {
            "node-a"
        }
    }

    #[tokio::test]
    async fn sweep_once_returns_claimed_executions() {
        let tenant_id = TenantId::new();
        let execution_id = model::ExecutionId::new();
        let manager = FakeLeaseManager {
            stale: StdMutex::new(vec![(tenant_id, execution_id)]),
            heartbeats_seen: StdMutex::new(Vec::new()),
        };
        let config = EngineConfig::default();

        let result = sweep_once(&manager, &config).await.unwrap();
        assert_eq!(result.claimed.len(), 1);
        assert_eq!(result.claimed[0].1, execution_id);
    }

    #[tokio::test]
    async fn sweep_once_is_empty_when_nothing_is_stale() {
        let manager = FakeLeaseManager {
            stale: StdMutex::new(Vec::new()),
            heartbeats_seen: StdMutex::new(Vec::new()),
        };
        let config = EngineConfig::default();

        let result = sweep_once(&manager, &config).await.unwrap();
        assert!(result.claimed.is_empty());
    }
}
