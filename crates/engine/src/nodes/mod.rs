//! One executor per node variant, dispatched by the node's variant tag.

pub mod action;
pub mod end;
pub mod fork_join;
pub mod generic;
pub mod loop_node;
pub mod parallel;
pub mod plan_handler;
pub mod standard;

use std::sync::Arc;

use crate::context::{GenericNodeHandler, NodeExecutor};
use crate::registry::Registry;

/// Build a registry populated with the built-in executor for every closed
/// `Node` variant tag. `Generic` dispatches through its own
/// `GenericNodeHandler` registry instead of this one — see
/// `default_generic_handlers`.
pub fn default_registry() -> Registry<dyn NodeExecutor> {
    let mut registry = Registry::new();
    registry.register("standard", Arc::new(standard::StandardExecutor) as Arc<dyn NodeExecutor>);
    registry.register("parallel", Arc::new(parallel::ParallelExecutor) as Arc<dyn NodeExecutor>);
    registry.register("fork_join", Arc::new(fork_join::ForkJoinExecutor) as Arc<dyn NodeExecutor>);
    registry.register("loop", Arc::new(loop_node::LoopExecutor) as Arc<dyn NodeExecutor>);
    registry.register("action", Arc::new(action::ActionExecutor) as Arc<dyn NodeExecutor>);
    registry.register("generic", Arc::new(generic::GenericExecutor) as Arc<dyn NodeExecutor>);
    registry.register("end", Arc::new(end::EndExecutor) as Arc<dyn NodeExecutor>);
    registry
}

/// Build a registry of the built-in `Generic`-node handlers: today, just
/// `"plan"`, the driver-level entry point for the plan executor. Callers are
/// free to register additional type tags of their own alongside it.
pub fn default_generic_handlers() -> Registry<dyn GenericNodeHandler> {
    let mut registry = Registry::new();
    registry.register("plan", Arc::new(plan_handler::PlanHandler) as Arc<dyn GenericNodeHandler>);
    registry
}
