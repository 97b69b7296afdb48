//! Rubric evaluation: scoring an agent's output against a `Rubric`'s
//! weighted criteria.

use model::{Criterion, CriterionScore, EvaluationType, Rubric, RubricEvaluation};

use crate::error::RubricError;
use crate::json_extract::{extract_first_json_object, read_f64_alias, read_string_alias};

const SCORE_ALIASES: &[&str] = &["score", "rating", "self_score"];
const RECOMMENDATION_ALIASES: &[&str] = &["recommendation", "suggestion", "feedback"];

/// Score `output` against every criterion in `rubric` and produce the
/// weighted final evaluation. `output` is the agent's raw text response;
/// self-evaluation criteria parse a JSON object embedded in it.
pub fn evaluate(rubric: &Rubric, output: &str) -> RubricEvaluation {
    let extracted = extract_first_json_object(output);

    let per_criterion: Vec<CriterionScore> = rubric
        .criteria
        .iter()
        .map(|criterion| score_criterion(criterion, output, extracted.as_ref()))
        .collect();

    let weight_sum: f64 = rubric.criteria.iter().map(|c| c.weight).sum();
    let weighted_sum: f64 = rubric
        .criteria
        .iter()
        .zip(&per_criterion)
        .map(|(c, s)| c.weight * s.score)
        .sum();

    let score = if weight_sum > 0.0 {
        100.0 * weighted_sum / weight_sum
    } else {
        0.0
    };

    // Per spec's testable property: `passed = (score >= passThreshold)`,
    // full stop. A criterion's own `min_score` gates only its own
    // `CriterionScore.passed` flag (diagnostic detail in `per_criterion`),
    // not the aggregate verdict.
    let passed = score >= rubric.pass_threshold;

    RubricEvaluation {
        rubric_id: rubric.id.clone(),
        score,
        passed,
        per_criterion,
    }
}

fn score_criterion(criterion: &Criterion, output: &str, extracted: Option<&serde_json::Value>) -> CriterionScore {
    let raw_score = match criterion.evaluation_type {
        // No recoverable score reads as "no opinion", not a failure.
        EvaluationType::SelfEvaluation => extracted
            .and_then(|v| read_f64_alias(v, SCORE_ALIASES))
            .map(normalize_self_reported_score)
            .unwrap_or(1.0),
        EvaluationType::RuleBased => evaluate_rule_based(criterion, output),
    };

    let score = raw_score.clamp(0.0, 1.0);
    let passed = score >= criterion.min_score;

    CriterionScore {
        criterion_id: criterion.id.clone(),
        score,
        passed,
    }
}

/// Agents report self-evaluation scores on a 0-100 scale (the spec's own
/// examples are `{"score": 40}`, `{"score": 85}`); the engine's internal
/// scale is 0-1, matched by `min_score`/`pass_threshold`'s own units once
/// aggregated back to 0-100 in `evaluate`. A value already within [0,1] is
/// passed through unchanged, so an agent that reports a fraction directly
/// still works.
fn normalize_self_reported_score(raw: f64) -> f64 {
    if raw > 1.0 {
        raw / 100.0
    } else {
        raw
    }
}

/// Deterministic rule-based scoring: `evaluation_logic` is a substring the
/// output must contain to pass. Anything more elaborate belongs in a
/// dedicated `ActionHandler`, not this evaluator.
fn evaluate_rule_based(criterion: &Criterion, output: &str) -> f64 {
    match &criterion.evaluation_logic {
        Some(needle) if !needle.is_empty() => {
            if output.contains(needle.as_str()) {
                1.0
            } else {
                0.0
            }
        }
        _ => 1.0,
    }
}

/// For every failing criterion, read a recommendation from the same
/// embedded JSON object and tag it with the rubric id, so a subsequent
/// backtracking attempt can fold it back into the prompt. Criteria with no
/// recommendation field contribute nothing.
pub fn collect_recommendations(rubric: &Rubric, output: &str, evaluation: &RubricEvaluation) -> Vec<String> {
    if evaluation.per_criterion.iter().all(|c| c.passed) {
        return Vec::new();
    }
    let Some(extracted) = extract_first_json_object(output) else {
        return Vec::new();
    };
    match read_string_alias(&extracted, RECOMMENDATION_ALIASES) {
        Some(recommendation) => vec![format!("[{}] {}", rubric.id, recommendation)],
        None => Vec::new(),
    }
}

/// Look up a rubric by id from the workflow's own rubric list (rubrics are
/// embedded in the workflow definition, not fetched separately per node).
pub fn find_rubric<'a>(rubrics: &'a [Rubric], rubric_id: &str) -> Result<&'a Rubric, RubricError> {
    rubrics
        .iter()
        .find(|r| r.id == rubric_id)
        .ok_or_else(|| RubricError::RubricNotFound(rubric_id.to_string()))
}
