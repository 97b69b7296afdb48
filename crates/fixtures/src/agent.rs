//! `ScriptedAgent` — a test double for `ports::Agent`.
//!
//! Returns a pre-scripted sequence of `AgentResponse`s, one per call; the
//! last scripted response repeats once the script is exhausted. Records
//! every call it receives and returns a programmer-specified result.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use model::AgentResponse;
use ports::Agent;

pub struct ScriptedAgent {
    id: String,
    config: serde_json::Value,
    script: Mutex<Vec<AgentResponse>>,
    calls: Mutex<Vec<(String, HashMap<String, serde_json::Value>)>>,
}

impl ScriptedAgent {
    /// An agent that returns `responses` in order, one per `execute` call,
    /// then repeats the final response for any further call.
    pub fn new(id: impl Into<String>, responses: Vec<AgentResponse>) -> Self {
        Self {
            id: id.into(),
            config: serde_json::Value::Null,
            script: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// An agent that always returns the same `Text` response.
    pub fn always_text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            vec![AgentResponse::Text {
                content: content.into(),
                metadata: HashMap::new(),
            }],
        )
    }

    /// Every prompt this agent was invoked with, in call order.
    pub fn prompts_seen(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> &serde_json::Value {
        &self.config
    }

    async fn execute(
        &self,
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> AgentResponse {
        self.calls.lock().unwrap().push((prompt.to_string(), context.clone()));

        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or_else(|| AgentResponse::Error {
                    message: "scripted agent has no responses configured".into(),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plays_back_script_in_order_then_repeats_last() {
        let agent = ScriptedAgent::new(
            "a",
            vec![
                AgentResponse::Error { message: "first try fails".into() },
                AgentResponse::Text { content: "ok".into(), metadata: HashMap::new() },
            ],
        );

        let ctx = HashMap::new();
        assert!(matches!(agent.execute("p", &ctx).await, AgentResponse::Error { .. }));
        assert!(matches!(agent.execute("p", &ctx).await, AgentResponse::Text { .. }));
        assert!(matches!(agent.execute("p", &ctx).await, AgentResponse::Text { .. }));
        assert_eq!(agent.call_count(), 3);
    }
}
