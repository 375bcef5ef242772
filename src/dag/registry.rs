// src/dag/registry.rs

//! Registry of named tasks, kept in registration order.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::cycle::find_cycle;
use crate::dag::task::Task;
use crate::dag::TaskName;
use crate::errors::{BuildGraphError, Result};

/// Which kind of constraint an edge in the task graph represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `depends_on`: the dependency is pulled into the run.
    Hard,
    /// `after`: ordering only, if both ends are scheduled.
    Soft,
}

/// All tasks known to a process.
///
/// Tasks are registered once at startup. Registration order is the
/// tie-breaker for resolution, so it is preserved.
///
/// Dependencies may reference tasks that are registered later; unknown
/// references are reported by [`TaskRegistry::validate`] and by
/// [`crate::dag::resolve`], both of which run before any action.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<TaskName, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task.
    ///
    /// Fails with [`BuildGraphError::DuplicateTask`] if the name is taken and
    /// with [`BuildGraphError::CyclicDependency`] if the task's hard
    /// dependencies close a cycle among registered tasks. On failure the
    /// registry is left unchanged.
    pub fn register(&mut self, task: Task) -> Result<()> {
        if self.index.contains_key(task.name()) {
            return Err(BuildGraphError::DuplicateTask(task.name().to_string()));
        }

        let idx = self.tasks.len();
        self.index.insert(task.name().to_string(), idx);
        self.tasks.push(task);

        let graph = self.edge_graph(false);
        if toposort(&graph, None).is_err() {
            let cycle = self.cycle_names(&graph);
            self.tasks.pop();
            self.index.retain(|_, i| *i != idx);
            return Err(BuildGraphError::CyclicDependency { cycle });
        }

        debug!(task = %self.tasks[idx].name(), index = idx, "registered task");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registration index of a task.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn task_at(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.name())
    }

    /// Check the whole registry: every `depends_on` and `after` reference is
    /// registered, and the combined graph is acyclic.
    pub fn validate(&self) -> Result<()> {
        for task in &self.tasks {
            for dep in task.dependencies().iter().chain(task.after_refs()) {
                if !self.contains(dep) {
                    return Err(BuildGraphError::UnknownDependency {
                        task: task.name().to_string(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let graph = self.edge_graph(true);
        if toposort(&graph, None).is_err() {
            return Err(BuildGraphError::CyclicDependency {
                cycle: self.cycle_names(&graph),
            });
        }

        Ok(())
    }

    /// Graph over registration indices, edge direction `dep -> task`.
    ///
    /// References to unregistered tasks are left out.
    fn edge_graph(&self, include_soft: bool) -> DiGraphMap<usize, EdgeKind> {
        let mut graph = DiGraphMap::new();

        for idx in 0..self.tasks.len() {
            graph.add_node(idx);
        }

        for (idx, task) in self.tasks.iter().enumerate() {
            if include_soft {
                for other in task.after_refs() {
                    if let Some(&o) = self.index.get(other) {
                        graph.add_edge(o, idx, EdgeKind::Soft);
                    }
                }
            }
            for dep in task.dependencies() {
                if let Some(&d) = self.index.get(dep) {
                    graph.add_edge(d, idx, EdgeKind::Hard);
                }
            }
        }

        graph
    }

    pub(crate) fn cycle_names(&self, graph: &DiGraphMap<usize, EdgeKind>) -> Vec<TaskName> {
        find_cycle(graph)
            .unwrap_or_default()
            .into_iter()
            .map(|i| self.tasks[i].name().to_string())
            .collect()
    }
}
