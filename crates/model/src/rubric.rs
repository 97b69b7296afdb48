//! Rubric definitions and evaluation results.

use serde::{Deserialize, Serialize};

/// How a single criterion is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationType {
    /// Deterministic evaluation against `evaluation_logic`.
    RuleBased,
    /// The agent's own output is parsed for a self-reported score.
    SelfEvaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub weight: f64,
    pub min_score: f64,
    pub evaluation_type: EvaluationType,
    pub evaluation_logic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: String,
    pub version: u32,
    pub pass_threshold: f64,
    pub criteria: Vec<Criterion>,
}

/// Per-criterion scoring detail carried on a `RubricEvaluation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: String,
    pub score: f64,
    pub passed: bool,
}

/// Immutable result of scoring an agent output against a rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricEvaluation {
    pub rubric_id: String,
    pub score: f64,
    pub passed: bool,
    pub per_criterion: Vec<CriterionScore>,
}
