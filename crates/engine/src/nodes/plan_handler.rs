use async_trait::async_trait;
use model::{Plan, PlanSource, PlannedStep, NodeResult};

use crate::context::{ExecutionContext, GenericNodeHandler};
use crate::plan;

/// The driver-level entry point for the plan executor: a `Generic` node with
/// `type_tag = "plan"` whose `config` embeds the plan's steps. A `Standard`
/// node's agent turn only ever *surfaces* a `PlanProposal` (see
/// `nodes::standard`); running one is this handler's job, reached through
/// the same `type`-tag dispatch every other generic node kind uses.
///
/// Expected `config` shape: `{"source": "static" | "llm_generated", "steps": [PlannedStep, ...]}`.
/// `source` defaults to `static` when absent.
pub struct PlanHandler;

#[async_trait]
impl GenericNodeHandler for PlanHandler {
    async fn handle(&self, config: &serde_json::Value, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let node_id = match ctx.state.current_node_id.node_id() {
            Some(id) => id.clone(),
            None => return NodeResult::failure("plan handler invoked with no current node"),
        };

        let steps: Vec<PlannedStep> = match config.get("steps") {
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(steps) => steps,
                Err(err) => return NodeResult::failure(format!("invalid plan steps: {err}")),
            },
            None => return NodeResult::failure("plan node config missing 'steps'"),
        };

        let source = match config.get("source").and_then(|v| v.as_str()) {
            Some("llm_generated") => PlanSource::LlmGenerated,
            _ => PlanSource::Static,
        };

        let plan = Plan {
            id: uuid::Uuid::new_v4().to_string(),
            node_id: node_id.clone(),
            source,
            steps,
        };

        let outcome = plan::run(&node_id, plan, ctx.planner, ctx).await;

        let mut result = if outcome.success {
            NodeResult::success(outcome.output)
        } else {
            NodeResult::failure(outcome.output)
        };
        result.metadata.insert("plan_revisions".into(), serde_json::json!(outcome.revisions));
        result
    }
}
