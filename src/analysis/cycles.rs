//! Cycle detection on the parameter-level reference graph.

use std::collections::HashSet;

use petgraph::graph::{DiGraph, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// DFS three-coloring. Each back edge yields the cycle on the current path,
/// starting at the node the back edge returns to.
///
/// Start nodes and neighbors are visited in node index order, so the result is
/// deterministic. Rotations of an already reported cycle are dropped.
pub fn find_cycles<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let adjacency: Vec<Vec<NodeIndex>> = graph
        .node_indices()
        .map(|n| {
            let mut next: Vec<NodeIndex> = graph.neighbors(n).collect();
            next.sort();
            next.dedup();
            next
        })
        .collect();

    let mut color = vec![Color::White; graph.node_count()];
    let mut cycles = Vec::new();
    let mut seen = HashSet::new();

    for start in graph.node_indices() {
        if color[start.index()] != Color::White {
            continue;
        }
        color[start.index()] = Color::Gray;
        let mut path = vec![start];
        let mut cursor = vec![0usize];

        while let Some(&node) = path.last() {
            let depth = path.len() - 1;
            let next = adjacency[node.index()].get(cursor[depth]).copied();
            cursor[depth] += 1;

            let Some(m) = next else {
                color[node.index()] = Color::Black;
                path.pop();
                cursor.pop();
                continue;
            };
            match color[m.index()] {
                Color::White => {
                    color[m.index()] = Color::Gray;
                    path.push(m);
                    cursor.push(0);
                }
                Color::Gray => {
                    if let Some(from) = path.iter().position(|&p| p == m) {
                        let cycle = path[from..].to_vec();
                        if seen.insert(canonical(&cycle)) {
                            cycles.push(cycle);
                        }
                    }
                }
                Color::Black => {}
            }
        }
    }

    cycles
}

fn canonical(cycle: &[NodeIndex]) -> Vec<NodeIndex> {
    let pivot = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| **n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = cycle[pivot..].to_vec();
    rotated.extend_from_slice(&cycle[..pivot]);
    rotated
}
