//! Kahn's algorithm over a `DiGraph` (parent → child edges) with a
//! deterministic tie-break: among tables whose dependencies are all placed,
//! the earliest declared goes next.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use shared::models::TableName;
use shared::{AppError, AppResult, ErrorCode};

use super::TableSpec;

/// Dependency graph; node indices follow declaration order
fn dependency_graph(specs: &[TableSpec]) -> AppResult<DiGraph<TableName, ()>> {
    let mut graph = DiGraph::with_capacity(specs.len(), specs.len());
    let nodes: Vec<NodeIndex> = specs.iter().map(|s| graph.add_node(s.name)).collect();

    for (child, spec) in nodes.iter().zip(specs) {
        for dep in &spec.depends_on {
            let Some(parent) = specs.iter().position(|s| s.name == *dep) else {
                return Err(AppError::with_message(
                    ErrorCode::TableDependencyUnknown,
                    format!("{} depends on undeclared table {}", spec.name, dep),
                )
                .with_detail("table", spec.name.as_str())
                .with_detail("dependency", dep.as_str()));
            };
            graph.add_edge(nodes[parent], *child, ());
        }
    }
    Ok(graph)
}

pub fn topo_sort(specs: &[TableSpec]) -> AppResult<Vec<TableName>> {
    let graph = dependency_graph(specs)?;

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.edges_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(Reverse)
        .collect();

    let mut placed = vec![false; graph.node_count()];
    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(next)) = ready.pop() {
        placed[next.index()] = true;
        order.push(graph[next]);
        for edge in graph.edges_directed(next, Direction::Outgoing) {
            let child = edge.target();
            in_degree[child.index()] -= 1;
            if in_degree[child.index()] == 0 {
                ready.push(Reverse(child));
            }
        }
    }

    if order.len() < graph.node_count() {
        let stuck: Vec<&str> = graph
            .node_indices()
            .filter(|n| !placed[n.index()])
            .map(|n| graph[n].as_str())
            .collect();
        return Err(AppError::with_message(
            ErrorCode::TableDependencyCycle,
            format!("Dependency cycle among: {}", stuck.join(", ")),
        )
        .with_detail("tables", stuck));
    }

    Ok(order)
}
