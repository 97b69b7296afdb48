//! `model` crate — the shared data model for the workflow engine.
//!
//! These types are the source of truth for what a workflow, its runtime
//! state, and its supporting artifacts (rubrics, plans) look like in memory.
//! They carry no behaviour beyond small invariant-checking constructors;
//! the execution logic that interprets them lives in the `engine` crate.

pub mod ids;
pub mod workflow;
pub mod agent;
pub mod transition;
pub mod execution;
pub mod rubric;
pub mod plan;
pub mod error;

pub use error::ModelError;
pub use ids::{ExecutionId, NodeId, NodeRef, TenantId, WorkflowId};
pub use workflow::{ActionKind, JoinPolicy, LoopCondition, Node, ReviewConfig, ReviewMode, Workflow};
pub use agent::{AgentBinding, AgentResponse};
pub use transition::{ScoreOperator, ScoreRule, TransitionRule};
pub use execution::{
    BacktrackEvent, BacktrackType, ExecutionHistory, ExecutionState, ExecutionStep, ExitStatus,
    NodeResult, NodeStatus, Snapshot,
};
pub use rubric::{Criterion, CriterionScore, EvaluationType, Rubric, RubricEvaluation};
pub use plan::{Plan, PlanSource, PlannedStep};
