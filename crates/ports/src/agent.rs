//! `Agent` and `AgentProvider` capabilities.

use std::collections::HashMap;

use async_trait::async_trait;
use model::AgentResponse;

use crate::error::PortsError;

/// A single agent instance. Not thread-safe per instance: callers must
/// not invoke `execute` concurrently on the same `Agent` — one call in
/// flight per instance.
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> &str;

    fn config(&self) -> &serde_json::Value;

    async fn execute(
        &self,
        prompt: &str,
        context: &HashMap<String, serde_json::Value>,
    ) -> AgentResponse;
}

/// A factory for `Agent` instances bound to a particular provider (OpenAI,
/// Anthropic, a stub, ...). When more than one provider supports a model,
/// the provider with the highest `priority` wins.
#[async_trait]
pub trait AgentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> i32;

    fn supports_model(&self, model: &str) -> bool;

    async fn create_agent(
        &self,
        id: &str,
        config: serde_json::Value,
        credentials: &HashMap<String, String>,
    ) -> Result<Box<dyn Agent>, PortsError>;
}
