//! Parse phase: editor nodes + edges → `ParsedWorkflow`.

pub mod graph;
pub mod topo;
pub mod types;
pub mod workflow;

pub use graph::ActionGraph;
pub use types::*;
pub use workflow::{ParsedWorkflow, WorkflowSummary};

use serde::Deserialize;

use crate::error::CompilerError;

/// Editor graph document: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<ActionNode>,
    #[serde(default)]
    pub edges: Vec<ActionEdge>,
}

/// Compile the control-flow graph.
///
/// Never fails: structural problems are recorded on `ParsedWorkflow::errors`, and
/// a cyclic graph still yields a best-effort order (released actions first, then
/// the residual actions in insertion order).
pub fn parse(nodes: &[ActionNode], edges: &[ActionEdge]) -> ParsedWorkflow {
    let build = ActionGraph::build(nodes, edges);
    let mut errors = build.errors;
    let graph = &build.graph;

    let order = topo::topo_sort(graph);
    let name = |idx: &petgraph::graph::NodeIndex| graph.graph[*idx].clone();

    let mut execution_order: Vec<String> = order.ordered.iter().map(name).collect();
    let residual_actions: Vec<String> = order.residual.iter().map(name).collect();
    execution_order.extend(residual_actions.iter().cloned());
    let root_actions: Vec<String> = order.roots.iter().map(name).collect();

    if build.actions.is_empty() {
        errors.push(CompilerError::parse("P005", "Workflow has no actions", None));
    }
    if !residual_actions.is_empty() {
        log::warn!("control-flow cycle among {:?}", residual_actions);
        errors.push(CompilerError::parse(
            "P004",
            format!(
                "Control-flow cycle detected among actions: {}",
                residual_actions.join(", ")
            ),
            residual_actions.first().cloned(),
        ));
    }

    let summary = WorkflowSummary {
        action_count: build.actions.len(),
        edge_count: build.edges.len(),
        root_count: root_actions.len(),
        leaf_count: build
            .actions
            .iter()
            .filter(|a| graph.outgoing_count(&a.id) == 0)
            .count(),
        parameter_count: build.actions.iter().map(|a| a.parameters.len()).sum(),
    };

    log::debug!(
        "parsed {} actions, {} edges, {} structural errors",
        summary.action_count,
        summary.edge_count,
        errors.len()
    );

    ParsedWorkflow {
        actions: build.actions,
        execution_order,
        root_actions,
        edges: build.edges,
        residual_actions,
        errors,
        summary,
    }
}

/// Deserialize a graph document and parse it.
pub fn parse_json(json: &str) -> Result<ParsedWorkflow, Vec<CompilerError>> {
    let doc = serde_json::from_str::<GraphDocument>(json).map_err(|e| {
        vec![CompilerError::parse(
            "P001",
            format!("Failed to parse workflow JSON: {}", e),
            None,
        )]
    })?;
    Ok(parse(&doc.nodes, &doc.edges))
}
