//! The `NodeExecutor` contract and the `ExecutionContext` passed to it.
//!
//! One trait every node-variant strategy implements, one context struct
//! that carries everything a strategy needs without reaching into
//! thread-locals or globals: a registry per variant tag plus recursive
//! sub-dispatch, and a full `ExecutionState` the richer node variants
//! (`Loop`, `Parallel`) need to mutate.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use model::{ExecutionState, Node, NodeResult, TenantId, Workflow};
use ports::{Agent, ActionHandler, Observer};

use crate::config::EngineConfig;
use crate::plan::Planner;
use crate::registry::Registry;

/// Looked up by a `Generic` node's `type` tag. Kept
/// separate from `NodeExecutor` because a generic handler doesn't know
/// about node variants at all — it just receives the node's free-form
/// config map.
#[async_trait]
pub trait GenericNodeHandler: Send + Sync {
    async fn handle(&self, config: &serde_json::Value, ctx: &mut ExecutionContext<'_>) -> NodeResult;
}

/// Per-execution ambient data and capability lookups, threaded through every
/// node dispatch as an explicit value rather than thread-local state — this
/// matters both for clarity and because a recovered execution may resume on
/// a different worker/thread than the one that started it.
pub struct ExecutionContext<'a> {
    pub tenant_id: TenantId,
    pub workflow: &'a Workflow,
    pub state: &'a mut ExecutionState,
    pub agents: &'a Registry<dyn Agent>,
    pub node_executors: &'a Registry<dyn NodeExecutor>,
    pub action_handlers: &'a Registry<dyn ActionHandler>,
    pub tools: &'a Registry<dyn ActionHandler>,
    pub generic_handlers: &'a Registry<dyn GenericNodeHandler>,
    pub observer: &'a dyn Observer,
    pub cooperative: &'a CooperativeExecutor,
    pub config: &'a EngineConfig,
    /// Consulted by the plan executor (reached through a `Generic` node's
    /// `"plan"` type tag, see `nodes::plan_handler::PlanHandler`) to revise a
    /// plan if one of its steps fails.
    pub planner: &'a dyn Planner,
}

impl<'a> ExecutionContext<'a> {
    /// Build a child context over a different `ExecutionState`, sharing
    /// every read-only capability. Used by `Parallel`/`ForkJoin` to give
    /// each child its own isolated context map to mutate: merging happens
    /// after the fact, in declaration order, not through shared mutable
    /// state during concurrent execution.
    pub fn with_state<'b>(&'b self, state: &'b mut ExecutionState) -> ExecutionContext<'b>
    where
        'a: 'b,
    {
        ExecutionContext {
            tenant_id: self.tenant_id,
            workflow: self.workflow,
            state,
            agents: self.agents,
            node_executors: self.node_executors,
            action_handlers: self.action_handlers,
            tools: self.tools,
            generic_handlers: self.generic_handlers,
            observer: self.observer,
            cooperative: self.cooperative,
            config: self.config,
            planner: self.planner,
        }
    }
}

/// One execution strategy per node variant; all share this
/// contract. Reentrant: an executor instance may be invoked for many
/// concurrent executions of the same workflow, so it must not hold
/// per-execution mutable state of its own — everything mutable lives on
/// `ExecutionContext::state`.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult;
}

/// A bounded cooperative pool for `Parallel`/`ForkJoin` fan-out; joining is
/// a fan-in barrier.
///
/// Children are awaited concurrently within the current task rather than
/// spawned as independent `'static` tasks, which keeps the borrowed
/// `ExecutionContext` lifetimes sound while still giving nondeterministic
/// completion order and nonblocking interleaving — cooperative concurrency,
/// not OS-thread parallelism.
pub struct CooperativeExecutor {
    max_concurrency: usize,
}

impl CooperativeExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run every future to completion, bounded to `max_concurrency` at a
    /// time, and return results in the *original* order (callers rely on
    /// index-stable results to merge children deterministically even though
    /// completion order is nondeterministic).
    pub async fn run_all<'f, T: Send + 'f>(&self, futures: Vec<BoxFuture<'f, T>>) -> Vec<T> {
        let len = futures.len();
        let indexed = futures
            .into_iter()
            .enumerate()
            .map(|(i, fut)| async move { (i, fut.await) });

        let mut buffered = stream::iter(indexed).buffer_unordered(self.max_concurrency);
        let mut slots: Vec<Option<T>> = (0..len).map(|_| None).collect();
        while let Some((i, value)) = buffered.next().await {
            slots[i] = Some(value);
        }
        slots
            .into_iter()
            .map(|v| v.expect("every indexed future completes exactly once"))
            .collect()
    }
}
