//! Plan executor: runs a `Plan`'s non-synthesis steps in order through the
//! tool registry, revising on a step failure, then runs the synthesis step
//! through an agent call.

use model::{AgentResponse, NodeId, Plan, PlannedStep};
use ports::PortsError;

use crate::context::ExecutionContext;
use crate::template;

/// A planner capable of revising a plan after a failed step. Kept narrow on
/// purpose: the plan executor doesn't need to know how a revision is
/// produced, only that it can ask for one.
#[async_trait::async_trait]
pub trait Planner: Send + Sync {
    async fn revise(&self, original: &Plan, failed_step: &PlannedStep, failure_reason: &str) -> Plan;
}

pub struct PlanOutcome {
    pub success: bool,
    pub output: String,
    pub revisions: u32,
}

/// A `Planner` that never revises: the step's own failure reason becomes the
/// plan's failure, at the cost of never recovering from a transient one.
/// Stands in where nothing smarter is wired up — a local dry run, or a test
/// that only cares the plan executor runs at all.
pub struct StaticPlanner;

#[async_trait::async_trait]
impl Planner for StaticPlanner {
    async fn revise(&self, original: &Plan, _failed_step: &PlannedStep, _failure_reason: &str) -> Plan {
        original.clone()
    }
}

/// Run `plan` to completion (or exhaustion of `max_revisions`), invoking
/// `planner` to revise after a step failure.
pub async fn run(
    node_id: &NodeId,
    mut plan: Plan,
    planner: &dyn Planner,
    ctx: &mut ExecutionContext<'_>,
) -> PlanOutcome {
    ctx.observer.on_planner_start(&ctx.state.execution_id, node_id).await;

    let mut revisions = 0u32;
    let mut step_outputs: Vec<serde_json::Value> = Vec::new();

    'revision: loop {
        step_outputs.clear();

        let steps: Vec<PlannedStep> = plan.non_synthesis_steps().cloned().collect();
        for step in &steps {
            match run_step(step, ctx).await {
                Ok(output) => step_outputs.push(output),
                Err(reason) => {
                    if revisions >= ctx.config.max_plan_revisions {
                        ctx.observer.on_planner_complete(&ctx.state.execution_id, node_id).await;
                        return PlanOutcome {
                            success: false,
                            output: reason,
                            revisions,
                        };
                    }
                    plan = planner.revise(&plan, step, &reason).await;
                    revisions += 1;
                    continue 'revision;
                }
            }
        }

        break;
    }

    let output = match plan.synthesis_step() {
        Some(step) => match run_synthesis_step(step, &step_outputs, ctx).await {
            Ok(output) => output,
            Err(reason) => {
                ctx.observer.on_planner_complete(&ctx.state.execution_id, node_id).await;
                return PlanOutcome {
                    success: false,
                    output: reason,
                    revisions,
                };
            }
        },
        None => serde_json::Value::Array(step_outputs).to_string(),
    };

    ctx.observer.on_planner_complete(&ctx.state.execution_id, node_id).await;

    PlanOutcome {
        success: true,
        output,
        revisions,
    }
}

async fn run_step(step: &PlannedStep, ctx: &mut ExecutionContext<'_>) -> Result<serde_json::Value, String> {
    let handler = ctx
        .tools
        .get(&step.tool_name)
        .ok_or_else(|| PortsError::UnknownActionHandler(step.tool_name.clone()).to_string())?;

    let args = template::resolve_value(&step.args, &ctx.state.context);

    handler
        .execute(args, &ctx.state.context)
        .await
        .map(|result| result.output)
        .map_err(|err| err.to_string())
}

/// The synthesis step is an agent call, not a tool call: `step.tool_name`
/// names the agent to invoke, and the prompt is built from the step's own
/// description plus every accumulated non-synthesis step output, so the
/// agent can compose a final answer out of what came before.
async fn run_synthesis_step(
    step: &PlannedStep,
    step_outputs: &[serde_json::Value],
    ctx: &mut ExecutionContext<'_>,
) -> Result<String, String> {
    let agent = ctx
        .agents
        .get(&step.tool_name)
        .ok_or_else(|| PortsError::UnknownAgent(step.tool_name.clone()).to_string())?;

    let instructions = template::resolve(&step.description, &ctx.state.context);
    let prompt = serde_json::json!({
        "instructions": instructions,
        "step_outputs": step_outputs,
    })
    .to_string();

    match agent.execute(&prompt, &ctx.state.context).await {
        AgentResponse::Text { content, .. } => Ok(content),
        AgentResponse::Error { message } => Err(message),
        other => Err(format!("synthesis step expected a Text response, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use model::{ExecutionId, ExecutionState, PlanSource, TenantId, WorkflowId};
    use ports::{ActionHandler, ActionResult, Agent};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::EngineConfig;
    use crate::context::CooperativeExecutor;
    use crate::registry::Registry;
    use ports::Observer;

    struct CountingTool {
        calls: AtomicUsize,
        fail_until: usize,
    }

    #[async_trait]
    impl ActionHandler for CountingTool {
        fn handler_id(&self) -> &str {
            "counting_tool"
        }

        async fn execute(
            &self,
            payload: serde_json::Value,
            _context: &HashMap<String, serde_json::Value>,
        ) -> Result<ActionResult, PortsError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_until {
                Err(PortsError::Io("transient failure".into()))
            } else {
                Ok(ActionResult { output: payload })
            }
        }
    }

    struct NoopPlanner;

    #[async_trait]
    impl Planner for NoopPlanner {
        async fn revise(&self, original: &Plan, _failed_step: &PlannedStep, _reason: &str) -> Plan {
            original.clone()
        }
    }

    fn plan() -> Plan {
        Plan {
            id: "p1".into(),
            node_id: NodeId::new("n1"),
            source: PlanSource::Static,
            steps: vec![PlannedStep {
                index: 0,
                tool_name: "counting_tool".into(),
                args: serde_json::json!({"x": 1}),
                description: "step".into(),
                is_synthesize: false,
            }],
        }
    }

    struct NoopObserver;
    impl Observer for NoopObserver {}

    #[tokio::test]
    async fn succeeds_immediately_when_tool_succeeds() {
        let tool = Arc::new(CountingTool { calls: AtomicUsize::new(0), fail_until: 0 });
        let mut tools: Registry<dyn ActionHandler> = Registry::new();
        tools.register("counting_tool", tool as Arc<dyn ActionHandler>);

        let agents = Registry::new();
        let node_executors = Registry::new();
        let action_handlers = Registry::new();
        let generic_handlers = Registry::new();
        let observer = NoopObserver;
        let cooperative = CooperativeExecutor::new(4);
        let config = EngineConfig::default();

        let workflow = model::Workflow {
            id: WorkflowId::new(),
            name: "wf".into(),
            start_node_id: NodeId::new("n1"),
            nodes: HashMap::new(),
            agent_bindings: vec![],
            rubrics: vec![],
        };
        let mut state = ExecutionState::new(ExecutionId::new(), WorkflowId::new(), NodeId::new("n1"));

        let planner = NoopPlanner;
        let mut ctx = ExecutionContext {
            tenant_id: TenantId::new(),
            workflow: &workflow,
            state: &mut state,
            agents: &agents,
            node_executors: &node_executors,
            action_handlers: &action_handlers,
            tools: &tools,
            generic_handlers: &generic_handlers,
            observer: &observer,
            cooperative: &cooperative,
            config: &config,
            planner: &planner,
        };

        let outcome = run(&NodeId::new("n1"), plan(), &NoopPlanner, &mut ctx).await;
        assert!(outcome.success);
        assert_eq!(outcome.revisions, 0);
    }

    #[tokio::test]
    async fn synthesis_step_is_dispatched_to_an_agent_not_a_tool() {
        let tool = Arc::new(CountingTool { calls: AtomicUsize::new(0), fail_until: 0 });
        let mut tools: Registry<dyn ActionHandler> = Registry::new();
        tools.register("counting_tool", tool as Arc<dyn ActionHandler>);

        let synth_agent = Arc::new(fixtures::ScriptedAgent::always_text("synth_agent", "final answer"));
        let mut agents: Registry<dyn Agent> = Registry::new();
        agents.register("synth_agent", synth_agent as Arc<dyn Agent>);

        let node_executors = Registry::new();
        let action_handlers = Registry::new();
        let generic_handlers = Registry::new();
        let observer = NoopObserver;
        let cooperative = CooperativeExecutor::new(4);
        let config = EngineConfig::default();

        let workflow = model::Workflow {
            id: WorkflowId::new(),
            name: "wf".into(),
            start_node_id: NodeId::new("n1"),
            nodes: HashMap::new(),
            agent_bindings: vec![],
            rubrics: vec![],
        };
        let mut state = ExecutionState::new(ExecutionId::new(), WorkflowId::new(), NodeId::new("n1"));

        let mut with_synthesis = plan();
        with_synthesis.steps.push(PlannedStep {
            index: 1,
            tool_name: "synth_agent".into(),
            args: serde_json::Value::Null,
            description: "compose the final answer".into(),
            is_synthesize: true,
        });

        let mut ctx = ExecutionContext {
            tenant_id: TenantId::new(),
            workflow: &workflow,
            state: &mut state,
            agents: &agents,
            node_executors: &node_executors,
            action_handlers: &action_handlers,
            tools: &tools,
            generic_handlers: &generic_handlers,
            observer: &observer,
            cooperative: &cooperative,
            config: &config,
            planner: &NoopPlanner,
        };

        let outcome = run(&NodeId::new("n1"), with_synthesis, &NoopPlanner, &mut ctx).await;
        assert!(outcome.success);
        assert_eq!(outcome.output, "final answer");
    }
}
