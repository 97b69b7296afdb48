//! Review controller: converts a `ReviewDecision` into the state mutation
//! the driver loop applies after resuming a paused execution.

use model::{ExecutionState, ExitStatus, NodeRef};
use ports::ReviewDecision;

/// Apply a reviewer's decision to `state`, in place. `Approve` is a no-op —
/// the driver simply continues from wherever transition evaluation would
/// have sent it. `Backtrack` rewinds `current_node_id` and trims history
/// above the target step. `Reject` routes straight to the terminal sentinel
/// with a failure exit status recorded in context.
pub fn apply_decision(state: &mut ExecutionState, decision: &ReviewDecision) {
    match decision {
        ReviewDecision::Approve => {}
        ReviewDecision::Backtrack { to_step_id } => {
            state.history.trim_above(to_step_id);
            state.current_node_id = NodeRef::Node(to_step_id.clone());
        }
        ReviewDecision::Reject { reason } => {
            state
                .context
                .insert("rejection_reason".into(), serde_json::json!(reason));
            state.context.insert("exit_status".into(), serde_json::json!(ExitStatus::Failure));
            state.current_node_id = NodeRef::Terminal;
        }
    }
}
