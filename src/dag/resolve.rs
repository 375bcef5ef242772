// src/dag/resolve.rs

//! Target resolution: closure over hard dependencies, then a deterministic
//! topological order that also honours soft `after` constraints.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::plan::ExecutionPlan;
use crate::dag::registry::{EdgeKind, TaskRegistry};
use crate::dag::TaskName;
use crate::errors::{BuildGraphError, Result};

/// Resolve `targets` against `registry` into an [`ExecutionPlan`].
///
/// - The scheduled set is the targets plus the transitive closure of their
///   `depends_on` lists. `after` never adds tasks.
/// - Every task comes after its hard dependencies and after any scheduled
///   task it lists in `after`.
/// - Ties go to the task registered first, so the same request always
///   yields the same order.
///
/// Errors: [`BuildGraphError::NoTargets`], [`BuildGraphError::UnknownTarget`],
/// [`BuildGraphError::UnknownDependency`] and
/// [`BuildGraphError::CyclicDependency`] (with the cycle spelled out).
pub fn resolve<S: AsRef<str>>(registry: &TaskRegistry, targets: &[S]) -> Result<ExecutionPlan> {
    if targets.is_empty() {
        return Err(BuildGraphError::NoTargets);
    }

    let mut requested: Vec<TaskName> = Vec::new();
    for target in targets {
        let target = target.as_ref();
        if !registry.contains(target) {
            return Err(BuildGraphError::UnknownTarget(target.to_string()));
        }
        if !requested.iter().any(|t| t == target) {
            requested.push(target.to_string());
        }
    }

    let scheduled = hard_closure(registry, &requested)?;
    let graph = ordering_graph(registry, &scheduled)?;
    let order = topological_order(&graph);

    if order.len() < scheduled.len() {
        let done: BTreeSet<usize> = order.iter().copied().collect();
        let mut stuck = graph.clone();
        for idx in done {
            stuck.remove_node(idx);
        }
        return Err(BuildGraphError::CyclicDependency {
            cycle: registry.cycle_names(&stuck),
        });
    }

    let order: Vec<TaskName> = order
        .into_iter()
        .filter_map(|i| registry.task_at(i))
        .map(|t| t.name().to_string())
        .collect();

    debug!(targets = ?requested, order = ?order, "resolved execution order");
    Ok(ExecutionPlan::new(requested, order))
}

/// Registration indices of the targets and everything they hard-depend on.
fn hard_closure(registry: &TaskRegistry, targets: &[TaskName]) -> Result<BTreeSet<usize>> {
    let mut scheduled = BTreeSet::new();
    let mut stack: Vec<usize> = targets
        .iter()
        .filter_map(|t| registry.index_of(t))
        .collect();

    while let Some(idx) = stack.pop() {
        if !scheduled.insert(idx) {
            continue;
        }
        let Some(task) = registry.task_at(idx) else {
            continue;
        };
        for dep in task.dependencies() {
            let dep_idx =
                registry
                    .index_of(dep)
                    .ok_or_else(|| BuildGraphError::UnknownDependency {
                        task: task.name().to_string(),
                        dependency: dep.clone(),
                    })?;
            stack.push(dep_idx);
        }
    }

    Ok(scheduled)
}

/// Ordering graph over the scheduled tasks, edge direction `before -> after`.
fn ordering_graph(
    registry: &TaskRegistry,
    scheduled: &BTreeSet<usize>,
) -> Result<DiGraphMap<usize, EdgeKind>> {
    let mut graph = DiGraphMap::new();

    for &idx in scheduled {
        graph.add_node(idx);
    }

    for &idx in scheduled {
        let Some(task) = registry.task_at(idx) else {
            continue;
        };

        for other in task.after_refs() {
            let other_idx =
                registry
                    .index_of(other)
                    .ok_or_else(|| BuildGraphError::UnknownDependency {
                        task: task.name().to_string(),
                        dependency: other.clone(),
                    })?;
            if scheduled.contains(&other_idx) {
                graph.add_edge(other_idx, idx, EdgeKind::Soft);
            }
        }

        for dep in task.dependencies() {
            if let Some(dep_idx) = registry.index_of(dep) {
                graph.add_edge(dep_idx, idx, EdgeKind::Hard);
            }
        }
    }

    Ok(graph)
}

/// Kahn's algorithm, always picking the ready task with the lowest
/// registration index. Returns fewer nodes than the graph holds if it has a
/// cycle.
fn topological_order(graph: &DiGraphMap<usize, EdgeKind>) -> Vec<usize> {
    let mut in_degree: BTreeMap<usize, usize> = graph
        .nodes()
        .map(|n| (n, graph.neighbors_directed(n, Direction::Incoming).count()))
        .collect();

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .filter(|&(_, &deg)| deg == 0)
        .map(|(&n, _)| n)
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());

    while let Some(node) = ready.pop_first() {
        order.push(node);
        for succ in graph.neighbors_directed(node, Direction::Outgoing) {
            if let Some(deg) = in_degree.get_mut(&succ) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(succ);
                }
            }
        }
    }

    order
}
