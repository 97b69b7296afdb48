//! Transition rule evaluation: given a node's ordered `TransitionRule` list
//! and the outcome of executing it, pick the next `NodeRef`.
//!
//! Rules are walked in declaration order; the first whose condition holds
//! wins. There is no rule priority beyond position in the list.

use model::{NodeId, NodeRef, NodeResult, NodeStatus, TransitionRule};

use crate::error::TransitionError;

/// Evaluate `rules` against `result`, returning the first matching target.
/// `score` is the rubric score (0-100) if one was computed for this node,
/// used by `Score` rules; `retry_count` is the state's current retry
/// counter, used by `Failure` rules.
pub fn evaluate(
    node_id: &NodeId,
    rules: &[TransitionRule],
    result: &NodeResult,
    score: Option<f64>,
    retry_count: u32,
) -> Result<NodeRef, TransitionError> {
    for rule in rules {
        match rule {
            TransitionRule::Success { target } if result.status == NodeStatus::Success => {
                return Ok(target.clone());
            }
            TransitionRule::Failure {
                retry_count: threshold,
                target,
            } if result.status == NodeStatus::Failure => {
                if retry_count < *threshold {
                    return Ok(NodeRef::Node(node_id.clone()));
                }
                return Ok(target.clone());
            }
            TransitionRule::Score { rules: score_rules } => {
                if let Some(score) = score {
                    if let Some(hit) = score_rules.iter().find(|r| r.matches(score)) {
                        return Ok(hit.target.clone());
                    }
                }
            }
            TransitionRule::Consensus(_) => {
                return Err(TransitionError::ConsensusUnimplemented);
            }
            _ => {}
        }
    }

    Err(TransitionError::NoMatchingRule(node_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::transition::{ConsensusRule, ScoreOperator, ScoreRule};

    fn node_id() -> NodeId {
        NodeId::new("n1")
    }

    #[test]
    fn success_rule_matches_success_result() {
        let rules = vec![TransitionRule::Success {
            target: NodeRef::Node(NodeId::new("next")),
        }];
        let result = NodeResult::success("ok");
        let target = evaluate(&node_id(), &rules, &result, None, 0).unwrap();
        assert_eq!(target, NodeRef::Node(NodeId::new("next")));
    }

    #[test]
    fn failure_rule_retargets_to_current_node_until_retry_count_threshold() {
        let rules = vec![TransitionRule::Failure {
            retry_count: 2,
            target: NodeRef::Node(NodeId::new("giveup")),
        }];
        let result = NodeResult::failure("boom");
        let target = evaluate(&node_id(), &rules, &result, None, 1).unwrap();
        assert_eq!(target, NodeRef::Node(node_id()));
        let target = evaluate(&node_id(), &rules, &result, None, 2).unwrap();
        assert_eq!(target, NodeRef::Node(NodeId::new("giveup")));
    }

    #[test]
    fn score_rule_picks_first_matching_range() {
        let rules = vec![TransitionRule::Score {
            rules: vec![
                ScoreRule {
                    operator: ScoreOperator::Gte,
                    value: Some(90.0),
                    range: None,
                    target: NodeRef::Node(NodeId::new("excellent")),
                },
                ScoreRule {
                    operator: ScoreOperator::Gte,
                    value: Some(50.0),
                    range: None,
                    target: NodeRef::Node(NodeId::new("ok")),
                },
            ],
        }];
        let result = NodeResult::success("output");
        let target = evaluate(&node_id(), &rules, &result, Some(60.0), 0).unwrap();
        assert_eq!(target, NodeRef::Node(NodeId::new("ok")));
    }

    #[test]
    fn no_matching_rule_is_an_error() {
        let rules = vec![TransitionRule::Success {
            target: NodeRef::Terminal,
        }];
        let result = NodeResult::failure("nope");
        assert!(matches!(
            evaluate(&node_id(), &rules, &result, None, 0),
            Err(TransitionError::NoMatchingRule(_))
        ));
    }

    #[test]
    fn consensus_rule_fails_closed() {
        let rules = vec![TransitionRule::Consensus(ConsensusRule {
            participants: vec!["a".into(), "b".into()],
            target: NodeRef::Terminal,
        })];
        let result = NodeResult::success("ok");
        assert!(matches!(
            evaluate(&node_id(), &rules, &result, None, 0),
            Err(TransitionError::ConsensusUnimplemented)
        ));
    }
}
