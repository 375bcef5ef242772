// src/dag/plan.rs

use std::fmt;

use crate::dag::TaskName;

/// The resolved, linear execution order for one run.
///
/// Only [`crate::dag::resolve`] creates plans, so every entry refers to a
/// task of the registry it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    targets: Vec<TaskName>,
    order: Vec<TaskName>,
}

impl ExecutionPlan {
    pub(crate) fn new(targets: Vec<TaskName>, order: Vec<TaskName>) -> Self {
        Self { targets, order }
    }

    /// Targets as requested by the caller.
    pub fn targets(&self) -> &[TaskName] {
        &self.targets
    }

    /// Tasks in execution order.
    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    pub fn contains(&self, task: &str) -> bool {
        self.order.iter().any(|t| t == task)
    }

    /// Position of `task` in the order.
    pub fn position(&self, task: &str) -> Option<usize> {
        self.order.iter().position(|t| t == task)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Display for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "targets: {}", self.targets.join(", "))?;
        for (i, step) in self.order.iter().enumerate() {
            writeln!(f, "{:>3}. {}", i + 1, step)?;
        }
        Ok(())
    }
}
