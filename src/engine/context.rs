// src/engine/context.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::TaskName;
use crate::params::Parameters;

/// Explicit state for a single run.
///
/// Guards get a shared reference, actions a mutable one. The context is
/// owned by the run and handed back inside the [`crate::engine::RunReport`].
#[derive(Debug, Default)]
pub struct RunContext {
    params: Parameters,
    succeeded: Vec<TaskName>,
    values: BTreeMap<String, String>,
    skip_requested: BTreeSet<TaskName>,
}

impl RunContext {
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Tasks the caller wants skipped even when scheduled.
    pub fn with_skipped<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.skip_requested.extend(tasks.into_iter().map(Into::into));
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// A parameter counts as set when it has a non-blank value.
    pub fn param_is_set(&self, name: &str) -> bool {
        self.params.is_set(name)
    }

    /// Whether `task` has already succeeded in this run.
    pub fn succeeded(&self, task: &str) -> bool {
        self.succeeded.iter().any(|t| t == task)
    }

    /// Tasks that succeeded so far, in completion order.
    pub fn succeeded_tasks(&self) -> &[TaskName] {
        &self.succeeded
    }

    /// Store a value for later tasks in the same run.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_skip_requested(&self, task: &str) -> bool {
        self.skip_requested.contains(task)
    }

    pub(crate) fn mark_succeeded(&mut self, task: &str) {
        if !self.succeeded(task) {
            self.succeeded.push(task.to_string());
        }
    }
}
