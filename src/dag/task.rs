// src/dag/task.rs

//! A single task: name, dependencies, optional guard and action.

use std::fmt;

use anyhow::Context;
use tracing::warn;

use crate::dag::TaskName;
use crate::engine::RunContext;

/// Guard predicate, evaluated when the task is reached in a run.
pub type GuardFn = Box<dyn Fn(&RunContext) -> bool>;

/// A fallible unit of work operating on the run context.
pub type ActionFn = Box<dyn Fn(&mut RunContext) -> anyhow::Result<()>>;

/// The work a task performs, with an optional declared fallback.
///
/// The fallback only runs when the primary operation fails. The action as a
/// whole fails only when there is no fallback or the fallback fails too.
pub struct Action {
    primary: ActionFn,
    fallback: Option<ActionFn>,
}

impl Action {
    pub fn new<F>(primary: F) -> Self
    where
        F: Fn(&mut RunContext) -> anyhow::Result<()> + 'static,
    {
        Self {
            primary: Box::new(primary),
            fallback: None,
        }
    }

    /// An action that always succeeds. Useful for aggregate targets that only
    /// exist to pull in dependencies.
    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&mut RunContext) -> anyhow::Result<()> + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Run the primary operation, then the fallback if the primary failed.
    pub fn run(&self, task: &str, ctx: &mut RunContext) -> anyhow::Result<()> {
        let primary_err = match (self.primary)(ctx) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let Some(fallback) = self.fallback.as_ref() else {
            return Err(primary_err);
        };

        warn!(
            task = %task,
            error = %format!("{primary_err:#}"),
            "primary action failed; running declared fallback"
        );

        fallback(ctx).with_context(|| {
            format!("fallback also failed (primary error: {primary_err:#})")
        })
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("has_fallback", &self.has_fallback())
            .finish_non_exhaustive()
    }
}

/// A named unit of work.
///
/// Built fluently:
///
/// ```
/// use buildgraph::dag::Task;
///
/// let compile = Task::new("compile")
///     .depends_on("restore")
///     .after("clean")
///     .only_when(|ctx| ctx.param_is_set("configuration"))
///     .executes(|_ctx| Ok(()));
/// assert_eq!(compile.dependencies(), ["restore"]);
/// ```
pub struct Task {
    name: TaskName,
    description: Option<String>,
    depends_on: Vec<TaskName>,
    after: Vec<TaskName>,
    guard: Option<GuardFn>,
    action: Action,
    best_effort: bool,
}

impl Task {
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            description: None,
            depends_on: Vec::new(),
            after: Vec::new(),
            guard: None,
            action: Action::noop(),
            best_effort: false,
        }
    }

    /// Add a hard dependency. Pulled into every run that schedules this task.
    pub fn depends_on(mut self, dep: impl Into<TaskName>) -> Self {
        let dep = dep.into();
        if !self.depends_on.contains(&dep) {
            self.depends_on.push(dep);
        }
        self
    }

    /// Add a soft ordering constraint: run after `other` if both are scheduled.
    pub fn after(mut self, other: impl Into<TaskName>) -> Self {
        let other = other.into();
        if !self.after.contains(&other) {
            self.after.push(other);
        }
        self
    }

    pub fn only_when<G>(mut self, guard: G) -> Self
    where
        G: Fn(&RunContext) -> bool + 'static,
    {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn executes<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut RunContext) -> anyhow::Result<()> + 'static,
    {
        self.action = Action::new(action);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn dependencies(&self) -> &[TaskName] {
        &self.depends_on
    }

    pub fn after_refs(&self) -> &[TaskName] {
        &self.after
    }

    pub fn is_best_effort(&self) -> bool {
        self.best_effort
    }

    pub fn has_guard(&self) -> bool {
        self.guard.is_some()
    }

    /// `true` when there is no guard or the guard passes.
    pub fn guard_allows(&self, ctx: &RunContext) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(ctx))
    }

    pub fn run_action(&self, ctx: &mut RunContext) -> anyhow::Result<()> {
        self.action.run(&self.name, ctx)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("after", &self.after)
            .field("has_guard", &self.has_guard())
            .field("action", &self.action)
            .field("best_effort", &self.best_effort)
            .finish()
    }
}
