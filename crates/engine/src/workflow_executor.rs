//! The top-level driver: `execute`/`resume` step one execution of one
//! workflow from its start node to a terminal, honoring transitions,
//! rubrics, reviews, and retries while checkpointing after every step.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use model::{
    BacktrackEvent, BacktrackType, ExecutionState, ExecutionStep, ExitStatus, Node, NodeRef, NodeResult,
    NodeStatus, Snapshot, TenantId, Workflow,
};
use ports::{ActionHandler, Agent, LeaseManager, Observer, ReviewDecision, ReviewHandler, SnapshotRepository};

use crate::config::EngineConfig;
use crate::context::{CooperativeExecutor, ExecutionContext, GenericNodeHandler, NodeExecutor};
use crate::error::EngineError;
use crate::plan::Planner;
use crate::registry::Registry;
use crate::review;
use crate::rubric;
use crate::transition;

/// Outcome of driving an execution to some stopping point. `Paused` means
/// control returns to the caller: the lease is released and the snapshot
/// checkpointed before returning, and the only way to make progress again
/// is to obtain a `ReviewDecision` out of band and call `resume` with the
/// returned snapshot.
#[derive(Debug)]
pub enum ExecutionOutcome {
    Completed { final_state: ExecutionState, exit_status: ExitStatus },
    Paused { snapshot: Snapshot, reason: String },
    Rejected { reason: String },
    Failed { error: String },
}

/// What the review gate does with a freshly-produced result: either the
/// node proceeds untouched (no review configured, or the reviewer already
/// approved it), or a decision rewound the state and the loop should simply
/// continue from wherever that decision left `current_node_id`.
enum ReviewGate {
    Proceed(NodeResult, Option<f64>),
    LoopContinue,
}

/// Every collaborator the driver needs, gathered in one place so `execute`
/// and `resume` share a single signature instead of threading a dozen
/// parameters.
pub struct Engine<'a> {
    pub tenant_id: TenantId,
    pub agents: &'a Registry<dyn Agent>,
    pub node_executors: &'a Registry<dyn NodeExecutor>,
    pub action_handlers: &'a Registry<dyn ActionHandler>,
    pub tools: &'a Registry<dyn ActionHandler>,
    pub generic_handlers: &'a Registry<dyn GenericNodeHandler>,
    pub observer: &'a dyn Observer,
    pub review_handler: &'a dyn ReviewHandler,
    pub snapshots: &'a dyn SnapshotRepository,
    pub lease_manager: &'a dyn LeaseManager,
    pub planner: &'a dyn Planner,
    pub config: EngineConfig,
}

impl<'a> Engine<'a> {
    /// Drive `workflow` from its start node with `initial_context` seeded
    /// into the execution state.
    #[instrument(skip_all, fields(workflow_id = %workflow.id))]
    pub async fn execute(
        &self,
        workflow: &Workflow,
        initial_context: HashMap<String, serde_json::Value>,
    ) -> ExecutionOutcome {
        let execution_id = model::ExecutionId::new();
        let mut state = ExecutionState::new(execution_id, workflow.id, workflow.start_node_id.clone());
        state.context = initial_context;

        if let Err(err) = self.lease_manager.acquire(&self.tenant_id, &execution_id).await {
            return ExecutionOutcome::Failed { error: err.to_string() };
        }

        self.run_loop(workflow, state).await
    }

    /// Continue a previously checkpointed execution.
    #[instrument(skip_all, fields(execution_id = %snapshot.execution_id))]
    pub async fn resume(&self, workflow: &Workflow, snapshot: Snapshot) -> ExecutionOutcome {
        let state = ExecutionState::restore(&snapshot);

        if let Err(err) = self.lease_manager.acquire(&self.tenant_id, &state.execution_id).await {
            return ExecutionOutcome::Failed { error: err.to_string() };
        }

        self.run_loop(workflow, state).await
    }

    async fn run_loop(&self, workflow: &Workflow, mut state: ExecutionState) -> ExecutionOutcome {
        let cooperative = CooperativeExecutor::new(self.config.max_parallel_children);

        loop {
            // The bare terminal sentinel carries no exit status of its own
            // (unlike an `End` node, which declares one) — reaching it
            // directly via a transition rule always finalizes as SUCCESS.
            // A workflow that needs a FAILURE/CANCEL exit must route to an
            // explicit `End` node instead of the terminal sentinel.
            if state.current_node_id.is_terminal() {
                return self.finalize(workflow, state, ExitStatus::Success).await;
            }

            let node_id = match state.current_node_id.node_id() {
                Some(id) => id.clone(),
                None => unreachable!("is_terminal() already handled the terminal case"),
            };

            let node = match workflow.node(&node_id) {
                Some(n) => n,
                None => {
                    return ExecutionOutcome::Failed {
                        error: EngineError::UnknownNode(node_id.clone()).to_string(),
                    }
                }
            };

            if let Node::End { exit_status } = node {
                let exit_status = *exit_status;
                state.history.push_step(ExecutionStep {
                    node_id: node_id.clone(),
                    result: NodeResult::end(exit_status),
                    timestamp: Utc::now(),
                    snapshot: None,
                });
                return self.finalize(workflow, state, exit_status).await;
            }

            // Resuming right after a review pause: the node already ran and
            // was scored, we only need the reviewer's decision now.
            if let Some(pending_result) = state.pending_review.take() {
                match self.consult_reviewer(workflow, node, &node_id, &mut state, pending_result).await {
                    Ok(ReviewGate::LoopContinue) => continue,
                    Ok(ReviewGate::Proceed(result, score)) => {
                        if let Err(outcome) = self.finish_step(&node_id, node, &mut state, result, score).await {
                            return outcome;
                        }
                    }
                    Err(outcome) => return outcome,
                }
                continue;
            }

            self.observer.on_node_start(&state.execution_id, &node_id).await;

            let executor = match self.node_executors.get(node.variant_tag()) {
                Some(e) => e,
                None => {
                    return ExecutionOutcome::Failed {
                        error: EngineError::NoExecutorForVariant(node.variant_tag().to_string()).to_string(),
                    }
                }
            };

            let result = {
                let mut ctx = ExecutionContext {
                    tenant_id: self.tenant_id,
                    workflow,
                    state: &mut state,
                    agents: self.agents,
                    node_executors: self.node_executors,
                    action_handlers: self.action_handlers,
                    tools: self.tools,
                    generic_handlers: self.generic_handlers,
                    observer: self.observer,
                    cooperative: &cooperative,
                    config: &self.config,
                    planner: self.planner,
                };
                executor.execute(node, &mut ctx).await
            };

            self.observer.on_node_complete(&state.execution_id, &node_id, &result).await;

            // ForkJoin hands control straight to its declared join node,
            // bypassing transition-rule evaluation entirely.
            if let Node::ForkJoin { join_node, .. } = node {
                if result.status == NodeStatus::Pending {
                    state.current_node_id = NodeRef::Node(join_node.clone());
                    if let Err(err) = self.checkpoint(&state).await {
                        return ExecutionOutcome::Failed { error: err };
                    }
                    continue;
                }
            }

            // Rubric scoring, and the `OptionalOnFailure` half of the review
            // gate below, both need to see failed results too — only the
            // scoring itself is success-only (only `Standard` nodes declare
            // a rubric id, and only a successful result has output worth
            // scoring).
            let mut score = None;
            if result.status == NodeStatus::Success {
                if let Node::Standard { rubric_id: Some(rubric_id), .. } = node {
                    match rubric::find_rubric(&workflow.rubrics, rubric_id) {
                        Ok(def) => {
                            let output = result.output.clone().unwrap_or_default();
                            let evaluation = rubric::evaluate(def, &output);
                            score = Some(evaluation.score);

                            if !evaluation.passed {
                                let recommendations = rubric::collect_recommendations(def, &output, &evaluation);
                                if !recommendations.is_empty() {
                                    state.context.insert(
                                        "self_evaluation_recommendations".into(),
                                        serde_json::json!(recommendations),
                                    );
                                }
                            }

                            state.rubric_evaluation = Some(evaluation.clone());

                            if !evaluation.passed {
                                if let Ok(target) =
                                    transition::evaluate(&node_id, node.rules(), &result, score, state.retry_count)
                                {
                                    // Record this attempt before backtracking: a
                                    // `to` node must already appear in step
                                    // history by the time its backtrack event is
                                    // recorded (see
                                    // `ExecutionHistory::backtrack_target_precedes_source`).
                                    state.history.push_step(ExecutionStep {
                                        node_id: node_id.clone(),
                                        result: result.clone(),
                                        timestamp: Utc::now(),
                                        snapshot: None,
                                    });
                                    state.history.push_backtrack(BacktrackEvent {
                                        from_node_id: node_id.clone(),
                                        to_node_id: target.node_id().cloned().unwrap_or_else(|| node_id.clone()),
                                        reason: "rubric".into(),
                                        kind: BacktrackType::RubricFail,
                                    });
                                    state.retry_count += 1;
                                    state.current_node_id = target;
                                    if let Err(err) = self.checkpoint(&state).await {
                                        return ExecutionOutcome::Failed { error: err };
                                    }
                                    continue;
                                }
                            }
                        }
                        Err(err) => {
                            return ExecutionOutcome::Failed { error: err.to_string() };
                        }
                    }
                }
            }

            match self.check_review_gate(node, &mut state, result, score).await {
                Ok((result, score)) => {
                    if let Err(outcome) = self.finish_step(&node_id, node, &mut state, result, score).await {
                        return outcome;
                    }
                }
                Err(outcome) => return outcome,
            }
        }
    }

    /// First pass over a freshly-produced result: if the node's `review`
    /// config gates it, checkpoint, release the lease, and hand control back
    /// to the caller as `Paused` rather than consulting the reviewer inline.
    async fn check_review_gate(
        &self,
        node: &Node,
        state: &mut ExecutionState,
        result: NodeResult,
        score: Option<f64>,
    ) -> Result<(NodeResult, Option<f64>), ExecutionOutcome> {
        if let Node::Standard { review: Some(review_config), .. } = node {
            let needs_review = match review_config.mode {
                model::ReviewMode::Required => true,
                model::ReviewMode::OptionalOnFailure => !result.is_success(),
            };
            if needs_review {
                state.pending_review = Some(result);
                let snapshot = state.snapshot();
                self.snapshots
                    .save(&self.tenant_id, &snapshot)
                    .await
                    .map_err(|err| ExecutionOutcome::Failed { error: err.to_string() })?;
                self.observer
                    .on_execution_paused(&state.execution_id, "review required")
                    .await;
                if let Err(err) = self.lease_manager.release(&self.tenant_id, &state.execution_id).await {
                    warn!(error = %err, "failed to release lease at review pause");
                }
                return Err(ExecutionOutcome::Paused { snapshot, reason: "review required".into() });
            }
        }
        Ok((result, score))
    }

    /// Second pass, entered only from `resume` when `pending_review` was
    /// set: consult the reviewer and translate its decision into either a
    /// rewound loop (`Backtrack`), a terminal rejection (`Reject`), or a
    /// pass-through to ordinary transition evaluation (`Approve`).
    async fn consult_reviewer(
        &self,
        workflow: &Workflow,
        node: &Node,
        node_id: &model::NodeId,
        state: &mut ExecutionState,
        result: NodeResult,
    ) -> Result<ReviewGate, ExecutionOutcome> {
        let decision = self.review_handler.request_review(node, &result, state, workflow).await;

        match &decision {
            ReviewDecision::Reject { reason } => {
                state.history.push_step(ExecutionStep {
                    node_id: node_id.clone(),
                    result: result.clone(),
                    timestamp: Utc::now(),
                    snapshot: None,
                });
                review::apply_decision(state, &decision);
                self.checkpoint(state).await.map_err(|error| ExecutionOutcome::Failed { error })?;
                Err(ExecutionOutcome::Rejected { reason: reason.clone() })
            }
            ReviewDecision::Backtrack { to_step_id } => {
                state.history.push_step(ExecutionStep {
                    node_id: node_id.clone(),
                    result: result.clone(),
                    timestamp: Utc::now(),
                    snapshot: None,
                });
                let to_node_id = to_step_id.clone();
                review::apply_decision(state, &decision);
                state.history.push_backtrack(BacktrackEvent {
                    from_node_id: node_id.clone(),
                    to_node_id,
                    reason: "review".into(),
                    kind: BacktrackType::Review,
                });
                self.checkpoint(state).await.map_err(|error| ExecutionOutcome::Failed { error })?;
                Ok(ReviewGate::LoopContinue)
            }
            ReviewDecision::Approve => {
                let score = state.rubric_evaluation.as_ref().map(|e| e.score);
                Ok(ReviewGate::Proceed(result, score))
            }
        }
    }

    /// Push the final history step for `result` and evaluate the node's
    /// transition rules, advancing `state.current_node_id` and
    /// `state.retry_count` accordingly, then checkpoint.
    async fn finish_step(
        &self,
        node_id: &model::NodeId,
        node: &Node,
        state: &mut ExecutionState,
        result: NodeResult,
        score: Option<f64>,
    ) -> Result<(), ExecutionOutcome> {
        state.history.push_step(ExecutionStep {
            node_id: node_id.clone(),
            result: result.clone(),
            timestamp: Utc::now(),
            snapshot: None,
        });

        match transition::evaluate(node_id, node.rules(), &result, score, state.retry_count) {
            Ok(target) => {
                if let NodeRef::Node(ref target_id) = target {
                    if result.status == NodeStatus::Failure && target_id == node_id {
                        state.retry_count += 1;
                    } else {
                        state.retry_count = 0;
                    }
                }
                state.current_node_id = target;
            }
            Err(err) => {
                return Err(ExecutionOutcome::Failed { error: err.to_string() });
            }
        }

        self.checkpoint(state).await.map_err(|error| ExecutionOutcome::Failed { error })
    }

    async fn checkpoint(&self, state: &ExecutionState) -> Result<(), String> {
        let snapshot = state.snapshot();
        self.snapshots
            .save(&self.tenant_id, &snapshot)
            .await
            .map_err(|e| e.to_string())?;
        self.observer.on_checkpoint(&state.execution_id, &snapshot).await;
        Ok(())
    }

    async fn finalize(&self, _workflow: &Workflow, state: ExecutionState, exit_status: ExitStatus) -> ExecutionOutcome {
        if let Err(err) = self.checkpoint(&state).await {
            warn!(error = %err, "failed to write final checkpoint");
        }
        if let Err(err) = self.lease_manager.release(&self.tenant_id, &state.execution_id).await {
            warn!(error = %err, "failed to release lease at completion");
        }
        self.observer.on_execution_completed(&state.execution_id, exit_status).await;
        info!(execution_id = %state.execution_id, ?exit_status, "execution completed");
        ExecutionOutcome::Completed { final_state: state, exit_status }
    }
}

use chrono::Utc;
