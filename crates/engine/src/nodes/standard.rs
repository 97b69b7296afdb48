use async_trait::async_trait;
use model::{AgentResponse, Node, NodeResult};
use ports::PortsError;

use crate::context::{ExecutionContext, NodeExecutor};
use crate::json_extract::extract_first_json_object;
use crate::template;
use crate::validate_output;

/// Resolves the agent, renders the prompt, invokes the agent, validates its
/// output, and extracts any named output parameters into context. Neither a
/// `ToolRequest` nor a `PlanProposal` response is acted on here — both are
/// only surfaced via metadata. A plan is run by a dedicated `Generic` node
/// (see `nodes::plan_handler::PlanHandler`), never as a side effect of a
/// standard node's agent turn.
pub struct StandardExecutor;

#[async_trait]
impl NodeExecutor for StandardExecutor {
    async fn execute(&self, node: &Node, ctx: &mut ExecutionContext<'_>) -> NodeResult {
        let (agent_id, prompt_template, output_params) = match node {
            Node::Standard {
                agent_id,
                prompt_template,
                output_params,
                ..
            } => (agent_id, prompt_template, output_params),
            _ => return NodeResult::failure("standard executor invoked on non-standard node"),
        };

        let agent = match ctx.agents.get(agent_id) {
            Some(agent) => agent,
            None => return NodeResult::failure(PortsError::UnknownAgent(agent_id.clone()).to_string()),
        };

        let prompt = template::resolve(prompt_template, &ctx.state.context);

        ctx.observer.on_agent_start(&ctx.state.execution_id, agent_id).await;
        let response = agent.execute(&prompt, &ctx.state.context).await;
        ctx.observer.on_agent_complete(&ctx.state.execution_id, agent_id).await;

        match response {
            AgentResponse::Error { message } => NodeResult::failure(message),
            AgentResponse::Text { content, metadata } => {
                if let Err(violation) = validate_output::validate(&content, ctx.config.max_output_bytes) {
                    return NodeResult::failure(violation.to_string());
                }

                if !output_params.is_empty() {
                    if let Some(extracted) = extract_first_json_object(&content) {
                        if let Some(obj) = extracted.as_object() {
                            for key in output_params {
                                if let Some(value) = obj.get(key) {
                                    ctx.state.context.insert(key.clone(), value.clone());
                                }
                            }
                        }
                    }
                }

                let mut result = NodeResult::success(content);
                result.metadata = metadata;
                result
            }
            // Surfaced to the caller via metadata but not acted upon — a
            // standard node has no single tool to dispatch a bare request to.
            AgentResponse::ToolRequest { tool_name, .. } => {
                let mut result = NodeResult::success("");
                result
                    .metadata
                    .insert("unhandled_tool_request".into(), serde_json::json!(tool_name));
                result
            }
            // Surfaced, not acted on — running a plan is a dedicated
            // `Generic` node's job (`PlanHandler`), not this one's.
            AgentResponse::PlanProposal { steps, reasoning } => {
                let mut result = NodeResult::success("");
                result.metadata.insert(
                    "unhandled_plan_proposal".into(),
                    serde_json::json!({ "steps": steps, "reasoning": reasoning }),
                );
                result
            }
        }
    }
}
