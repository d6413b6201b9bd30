//! Deterministic topological ordering (Kahn's algorithm).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::NodeIndex;

use super::graph::ActionGraph;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopoOrder {
    /// Nodes removed by Kahn's algorithm, in removal order.
    pub ordered: Vec<NodeIndex>,
    /// Nodes with nonzero in-degree left after removal, in insertion order.
    pub residual: Vec<NodeIndex>,
    /// Nodes with in-degree zero in the input graph, in insertion order.
    pub roots: Vec<NodeIndex>,
}

/// Kahn's algorithm with ties broken by insertion order: among the ready nodes
/// the one added to the graph first is always removed first.
pub fn topo_sort(graph: &ActionGraph) -> TopoOrder {
    let g = &graph.graph;
    let mut in_degree: Vec<usize> = g
        .node_indices()
        .map(|n| g.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let roots: Vec<NodeIndex> = g.node_indices().filter(|n| in_degree[n.index()] == 0).collect();
    let mut ready: BinaryHeap<Reverse<NodeIndex>> = roots.iter().copied().map(Reverse).collect();
    let mut ordered = Vec::with_capacity(g.node_count());
    let mut done = vec![false; g.node_count()];

    while let Some(Reverse(n)) = ready.pop() {
        ordered.push(n);
        done[n.index()] = true;
        for m in g.neighbors_directed(n, Direction::Outgoing) {
            let d = &mut in_degree[m.index()];
            *d = d.saturating_sub(1);
            if *d == 0 && !done[m.index()] {
                ready.push(Reverse(m));
            }
        }
    }

    let residual = g.node_indices().filter(|n| !done[n.index()]).collect();

    TopoOrder {
        ordered,
        residual,
        roots,
    }
}
