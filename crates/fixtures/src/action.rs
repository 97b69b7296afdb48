//! `ScriptedActionHandler` — a test double for `ports::ActionHandler`,
//! registered under a fixed `handler_id` and usable both as an `Action`
//! node's handler and as a plan-executor tool.

use std::sync::Mutex;

use async_trait::async_trait;
use ports::{ActionHandler, ActionResult, PortsError};

pub enum ScriptedOutcome {
    Succeed(serde_json::Value),
    Fail(String),
}

pub struct ScriptedActionHandler {
    handler_id: String,
    script: Mutex<Vec<ScriptedOutcome>>,
    calls: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedActionHandler {
    pub fn new(handler_id: impl Into<String>, outcomes: Vec<ScriptedOutcome>) -> Self {
        Self {
            handler_id: handler_id.into(),
            script: Mutex::new(outcomes),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A handler that always echoes its payload back as the result.
    pub fn echo(handler_id: impl Into<String>) -> Self {
        let handler_id = handler_id.into();
        Self {
            handler_id,
            script: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn payloads_seen(&self) -> Vec<serde_json::Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionHandler for ScriptedActionHandler {
    fn handler_id(&self) -> &str {
        &self.handler_id
    }

    async fn execute(
        &self,
        payload: serde_json::Value,
        _context: &std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<ActionResult, PortsError> {
        self.calls.lock().unwrap().push(payload.clone());

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Ok(ActionResult { output: payload });
        }
        match script.remove(0) {
            ScriptedOutcome::Succeed(value) => Ok(ActionResult { output: value }),
            ScriptedOutcome::Fail(reason) => Err(PortsError::Io(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_handler_returns_its_payload() {
        let handler = ScriptedActionHandler::echo("notify");
        let context = std::collections::HashMap::new();
        let result = handler.execute(serde_json::json!({"a": 1}), &context).await.unwrap();
        assert_eq!(result.output, serde_json::json!({"a": 1}));
        assert_eq!(handler.call_count(), 1);
    }

    #[tokio::test]
    async fn scripted_outcomes_play_back_in_order() {
        let handler = ScriptedActionHandler::new(
            "tool",
            vec![
                ScriptedOutcome::Fail("transient".into()),
                ScriptedOutcome::Succeed(serde_json::json!({"ok": true})),
            ],
        );
        let context = std::collections::HashMap::new();
        assert!(handler.execute(serde_json::json!({}), &context).await.is_err());
        let second = handler.execute(serde_json::json!({}), &context).await.unwrap();
        assert_eq!(second.output, serde_json::json!({"ok": true}));
    }
}
