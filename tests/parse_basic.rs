//! Integration tests for the Parse phase: editor JSON, execution order, roots.

use cadence_compiler::parse::{self, ActionEdge, ActionNode};

#[test]
fn parse_fixture_workflow() {
    let json = include_str!("fixtures/balance_swap_stake.json");
    let workflow = parse::parse_json(json).expect("Should parse successfully");
    assert!(workflow.errors.is_empty(), "{:?}", workflow.errors);
    assert_eq!(workflow.execution_order, vec!["balance", "swap", "stake"]);
    assert_eq!(workflow.root_actions, vec!["balance"]);
    assert_eq!(workflow.summary.action_count, 3);
    assert_eq!(workflow.summary.edge_count, 2);
    assert_eq!(workflow.summary.leaf_count, 1);
    assert_eq!(workflow.summary.parameter_count, 6);
    assert_eq!(workflow.action("balance").unwrap().display_name(), "Check balance");
}

#[test]
fn parse_invalid_json_returns_error() {
    let result = parse::parse_json("not valid json");
    let errors = result.unwrap_err();
    assert_eq!(errors[0].code, "P001");
}

#[test]
fn parse_is_deterministic() {
    let json = include_str!("fixtures/balance_swap_stake.json");
    let first = parse::parse_json(json).unwrap();
    let second = parse::parse_json(json).unwrap();
    assert_eq!(first.execution_order, second.execution_order);
    assert_eq!(first, second);
}

/// Diamond with an extra independent chain.
fn diamond() -> (Vec<ActionNode>, Vec<ActionEdge>) {
    let nodes = vec![
        ActionNode::new("d", "t"),
        ActionNode::new("b", "t"),
        ActionNode::new("a", "t"),
        ActionNode::new("c", "t"),
        ActionNode::new("x", "t"),
        ActionNode::new("y", "t"),
    ];
    let edges = vec![
        ActionEdge::new("a", "b"),
        ActionEdge::new("a", "c"),
        ActionEdge::new("b", "d"),
        ActionEdge::new("c", "d"),
        ActionEdge::new("x", "y"),
    ];
    (nodes, edges)
}

#[test]
fn every_edge_points_forward_in_execution_order() {
    let (nodes, edges) = diamond();
    let workflow = parse::parse(&nodes, &edges);
    assert!(workflow.is_acyclic());
    let positions = workflow.positions();
    for edge in &edges {
        assert!(
            positions[edge.source.as_str()] < positions[edge.target.as_str()],
            "edge {} is not forward",
            edge.label()
        );
    }
    // a and x are ready first; a was inserted before x.
    assert_eq!(workflow.execution_order, vec!["a", "b", "c", "d", "x", "y"]);
}

#[test]
fn roots_are_exactly_the_actions_without_incoming_edges() {
    let (nodes, edges) = diamond();
    let workflow = parse::parse(&nodes, &edges);
    for node in &nodes {
        let has_incoming = edges.iter().any(|e| e.target == node.id);
        assert_eq!(
            workflow.root_actions.contains(&node.id),
            !has_incoming,
            "root detection wrong for {}",
            node.id
        );
    }
}

#[test]
fn control_flow_cycle_degrades_to_partial_order() {
    let nodes = vec![
        ActionNode::new("start", "t").then("a"),
        ActionNode::new("a", "t").then("b"),
        ActionNode::new("b", "t").then("a"),
        ActionNode::new("tail", "t"),
    ];
    let workflow = parse::parse(&nodes, &[]);
    assert_eq!(workflow.execution_order, vec!["start", "tail", "a", "b"]);
    assert_eq!(workflow.residual_actions, vec!["a", "b"]);
    let cycle = workflow.errors.iter().find(|e| e.code == "P004").unwrap();
    assert!(cycle.message.contains("a, b"));
}

#[test]
fn dangling_edges_and_empty_workflows_are_reported() {
    let workflow = parse::parse(&[ActionNode::new("a", "t")], &[ActionEdge::new("a", "ghost")]);
    assert_eq!(workflow.errors.len(), 1);
    assert_eq!(workflow.errors[0].code, "P002");
    assert_eq!(workflow.execution_order, vec!["a"]);

    let empty = parse::parse(&[], &[]);
    assert!(empty.execution_order.is_empty());
    assert_eq!(empty.errors[0].code, "P005");
}
