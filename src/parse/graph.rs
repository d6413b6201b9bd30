//! petgraph-based control-flow graph over the action nodes.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{ActionEdge, ActionNode};
use crate::error::CompilerError;

/// Control-flow graph. Node weights are action ids; node index order equals
/// the editor's insertion order.
#[derive(Debug, Clone, Default)]
pub struct ActionGraph {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

/// Result of building the graph: the graph plus the inputs it accepted.
#[derive(Debug, Clone, Default)]
pub struct GraphBuild {
    pub graph: ActionGraph,
    /// Actions with unique ids, in insertion order.
    pub actions: Vec<ActionNode>,
    /// Deduplicated edges whose endpoints both exist.
    pub edges: Vec<ActionEdge>,
    pub errors: Vec<CompilerError>,
}

impl ActionGraph {
    /// Build from nodes (with their `next` lists) and an explicit edge list.
    ///
    /// Duplicate ids keep the first occurrence; dangling edges are dropped. Both
    /// are reported as errors rather than aborting the build.
    pub fn build(nodes: &[ActionNode], edges: &[ActionEdge]) -> GraphBuild {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut actions = Vec::with_capacity(nodes.len());
        let mut errors = Vec::new();

        for node in nodes {
            if node_indices.contains_key(&node.id) {
                errors.push(CompilerError::parse(
                    "P003",
                    format!("Duplicate action id '{}'", node.id),
                    Some(node.id.clone()),
                ));
                continue;
            }
            let idx = graph.add_node(node.id.clone());
            node_indices.insert(node.id.clone(), idx);
            actions.push(node.clone());
        }

        let candidates = actions
            .iter()
            .flat_map(|a| a.next.iter().map(|n| ActionEdge::new(a.id.clone(), n.clone())))
            .chain(edges.iter().cloned());

        let mut seen = HashSet::new();
        let mut accepted = Vec::new();
        for edge in candidates {
            let source_idx = node_indices.get(&edge.source);
            let target_idx = node_indices.get(&edge.target);

            match (source_idx, target_idx) {
                (Some(&s), Some(&t)) => {
                    if !seen.insert((s, t)) {
                        continue;
                    }
                    graph.add_edge(s, t, ());
                    accepted.push(edge);
                }
                (None, _) => {
                    errors.push(CompilerError::parse(
                        "P002",
                        format!(
                            "Edge '{}' references unknown source action '{}'",
                            edge.label(),
                            edge.source
                        ),
                        None,
                    ));
                }
                (_, None) => {
                    errors.push(CompilerError::parse(
                        "P002",
                        format!(
                            "Edge '{}' references unknown target action '{}'",
                            edge.label(),
                            edge.target
                        ),
                        Some(edge.source.clone()),
                    ));
                }
            }
        }

        GraphBuild {
            graph: ActionGraph {
                graph,
                node_indices,
            },
            actions,
            edges: accepted,
            errors,
        }
    }

    pub fn successors(&self, action_id: &str) -> Vec<&str> {
        self.neighbors(action_id, Direction::Outgoing)
    }

    pub fn predecessors(&self, action_id: &str) -> Vec<&str> {
        self.neighbors(action_id, Direction::Incoming)
    }

    pub fn incoming_count(&self, action_id: &str) -> usize {
        self.predecessors(action_id).len()
    }

    pub fn outgoing_count(&self, action_id: &str) -> usize {
        self.successors(action_id).len()
    }

    fn neighbors(&self, action_id: &str, dir: Direction) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(action_id) else {
            return vec![];
        };
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        found.sort();
        found.into_iter().map(|n| self.graph[n].as_str()).collect()
    }
}
