//! Workflow structural validation, exposed as its own entry point so the
//! CLI's `validate` subcommand and the repository's `save` path can both
//! reject a malformed workflow before it is ever executed.

use model::{ModelError, Workflow};

/// Check a workflow's structural invariants. Delegates to
/// `Workflow::check_invariants`, which does not reject cycles: `Loop`
/// bodies and backtracks are expected to revisit nodes.
pub fn validate(workflow: &Workflow) -> Result<(), ModelError> {
    workflow.check_invariants()
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{ExitStatus, JoinPolicy, Node, NodeId, NodeRef, TransitionRule, WorkflowId};
    use std::collections::HashMap;

    fn workflow_with(nodes: HashMap<NodeId, Node>, start: &str) -> Workflow {
        Workflow {
            id: WorkflowId::new(),
            name: "wf".into(),
            start_node_id: NodeId::new(start),
            nodes,
            agent_bindings: vec![],
            rubrics: vec![],
        }
    }

    #[test]
    fn accepts_a_minimal_valid_workflow() {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeId::new("start"),
            Node::Standard {
                agent_id: "a".into(),
                prompt_template: "hi".into(),
                rubric_id: None,
                review: None,
                output_params: vec![],
                rules: vec![TransitionRule::Success { target: NodeRef::Terminal }],
            },
        );
        let workflow = workflow_with(nodes, "start");
        assert!(validate(&workflow).is_ok());
    }

    #[test]
    fn rejects_unknown_start_node() {
        let workflow = workflow_with(HashMap::new(), "missing");
        assert!(validate(&workflow).is_err());
    }

    #[test]
    fn rejects_dangling_transition_target() {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeId::new("start"),
            Node::Standard {
                agent_id: "a".into(),
                prompt_template: "hi".into(),
                rubric_id: None,
                review: None,
                output_params: vec![],
                rules: vec![TransitionRule::Success {
                    target: NodeRef::Node(NodeId::new("nowhere")),
                }],
            },
        );
        let workflow = workflow_with(nodes, "start");
        assert!(validate(&workflow).is_err());
    }

    #[test]
    fn accepts_a_loop_back_to_an_earlier_node() {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeId::new("start"),
            Node::Loop {
                body_node: NodeId::new("body"),
                condition: model::LoopCondition::Always,
                max_iterations: 3,
                rules: vec![TransitionRule::Success { target: NodeRef::Terminal }],
            },
        );
        nodes.insert(
            NodeId::new("body"),
            Node::Standard {
                agent_id: "a".into(),
                prompt_template: "hi".into(),
                rubric_id: None,
                review: None,
                output_params: vec![],
                rules: vec![TransitionRule::Success {
                    target: NodeRef::Node(NodeId::new("start")),
                }],
            },
        );
        let workflow = workflow_with(nodes, "start");
        assert!(validate(&workflow).is_ok());
    }

    #[test]
    fn rejects_fork_join_with_unknown_join_node() {
        let mut nodes = HashMap::new();
        nodes.insert(
            NodeId::new("start"),
            Node::ForkJoin {
                children: vec![],
                join_policy: JoinPolicy::AllSucceed,
                join_node: NodeId::new("missing"),
                rules: vec![TransitionRule::Success { target: NodeRef::Terminal }],
            },
        );
        let workflow = workflow_with(nodes, "start");
        assert!(validate(&workflow).is_err());
    }

    #[test]
    fn end_node_needs_no_rules() {
        let mut nodes = HashMap::new();
        nodes.insert(NodeId::new("start"), Node::End { exit_status: ExitStatus::Success });
        let workflow = workflow_with(nodes, "start");
        assert!(validate(&workflow).is_ok());
    }
}
