// src/dag/cycle.rs

//! Cycle extraction for error reporting.
//!
//! `petgraph::algo::toposort` only tells us *one* node that sits on a cycle.
//! For a useful message we want the whole loop, so we look for a strongly
//! connected component that contains a cycle and walk it.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::{DiGraphMap, NodeTrait};

/// Find a cycle in `graph` and return it as a closed path.
///
/// The first node is repeated at the end, e.g. `[a, b, a]`. A self-loop is
/// returned as `[a, a]`. Returns `None` for acyclic graphs.
///
/// Deterministic: among cyclic components the one holding the smallest node
/// is chosen, and the walk always follows the smallest successor.
pub fn find_cycle<N, E>(graph: &DiGraphMap<N, E>) -> Option<Vec<N>>
where
    N: NodeTrait,
{
    let component = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || scc.iter().any(|&n| graph.contains_edge(n, n)))
        .min_by_key(|scc| scc.iter().copied().min())?;

    let start = component.iter().copied().min()?;
    let mut path = vec![start];
    let mut current = start;

    loop {
        let next = graph
            .neighbors(current)
            .filter(|n| component.contains(n))
            .min()?;

        if let Some(pos) = path.iter().position(|&n| n == next) {
            let mut cycle = path.split_off(pos);
            cycle.push(next);
            return Some(cycle);
        }

        path.push(next);
        current = next;
    }
}
