//! `ReviewHandler` test doubles.

use async_trait::async_trait;
use model::{ExecutionState, Node, NodeResult, Workflow};
use ports::{ReviewDecision, ReviewHandler};

/// Always approves — useful for tests that only need review *gating*
/// (pause + checkpoint) without exercising a backtrack or rejection.
pub struct AutoApproveReviewHandler;

#[async_trait]
impl ReviewHandler for AutoApproveReviewHandler {
    async fn request_review(
        &self,
        _node: &Node,
        _result: &NodeResult,
        _state: &ExecutionState,
        _workflow: &Workflow,
    ) -> ReviewDecision {
        ReviewDecision::Approve
    }
}

/// Returns one scripted decision per call, repeating the last once
/// exhausted — same call-then-repeat convention as `ScriptedAgent`.
pub struct ScriptedReviewHandler {
    script: std::sync::Mutex<Vec<ReviewDecision>>,
    calls: std::sync::Mutex<usize>,
}

impl ScriptedReviewHandler {
    pub fn new(decisions: Vec<ReviewDecision>) -> Self {
        Self {
            script: std::sync::Mutex::new(decisions),
            calls: std::sync::Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ReviewHandler for ScriptedReviewHandler {
    async fn request_review(
        &self,
        _node: &Node,
        _result: &NodeResult,
        _state: &ExecutionState,
        _workflow: &Workflow,
    ) -> ReviewDecision {
        *self.calls.lock().unwrap() += 1;
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or(ReviewDecision::Approve)
        }
    }
}
