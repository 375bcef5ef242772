// src/engine/status.rs

//! Per-task statuses and the report returned at the end of a run.

use std::fmt;
use std::time::Duration;

use crate::dag::TaskName;
use crate::engine::RunContext;
use crate::errors::{BuildGraphError, Result};

/// Final status of a registered task after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not part of the run, or never reached because the run aborted.
    NotScheduled,
    /// Reached, but not executed.
    Skipped,
    Succeeded,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::NotScheduled => "NotScheduled",
            TaskStatus::Skipped => "Skipped",
            TaskStatus::Succeeded => "Succeeded",
            TaskStatus::Failed => "Failed",
        };
        f.pad(s)
    }
}

/// Why a task was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Its guard evaluated to false.
    Guard,
    /// The caller asked for it to be skipped.
    Requested,
}

/// Outcome of one task.
#[derive(Debug)]
pub struct TaskReport {
    pub name: TaskName,
    pub status: TaskStatus,
    pub skip_reason: Option<SkipReason>,
    pub best_effort: bool,
    /// Wall time spent in the action; `None` if the action never ran.
    pub duration: Option<Duration>,
    /// Root cause for `Failed` tasks.
    pub error: Option<anyhow::Error>,
}

impl TaskReport {
    pub(crate) fn not_scheduled(name: &str, best_effort: bool) -> Self {
        Self {
            name: name.to_string(),
            status: TaskStatus::NotScheduled,
            skip_reason: None,
            best_effort,
            duration: None,
            error: None,
        }
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every scheduled task succeeded or was skipped.
    Succeeded,
    /// The run went through the whole plan, but best-effort tasks failed.
    CompletedWithFailures { failed: Vec<TaskName> },
    /// A task that is not best-effort failed and stopped the run.
    Aborted { task: TaskName },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }
}

/// Everything a caller needs to know about a finished run.
#[derive(Debug)]
pub struct RunReport {
    order: Vec<TaskName>,
    tasks: Vec<TaskReport>,
    outcome: RunOutcome,
    context: RunContext,
}

impl RunReport {
    pub(crate) fn new(
        order: Vec<TaskName>,
        tasks: Vec<TaskReport>,
        outcome: RunOutcome,
        context: RunContext,
    ) -> Self {
        Self {
            order,
            tasks,
            outcome,
            context,
        }
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// The resolved order the run walked (or started walking).
    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    /// Reports for every registered task, in registration order.
    pub fn tasks(&self) -> &[TaskReport] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&TaskReport> {
        self.tasks.iter().find(|t| t.name == name)
    }

    pub fn status_of(&self, name: &str) -> Option<TaskStatus> {
        self.task(name).map(|t| t.status)
    }

    pub fn error_of(&self, name: &str) -> Option<&anyhow::Error> {
        self.task(name).and_then(|t| t.error.as_ref())
    }

    /// Tasks whose action actually ran, in execution order.
    pub fn executed(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|name| {
                matches!(
                    self.status_of(name),
                    Some(TaskStatus::Succeeded | TaskStatus::Failed)
                )
            })
            .map(String::as_str)
            .collect()
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Turn an aborted run into [`BuildGraphError::ActionFailure`] carrying
    /// the original error. Other outcomes return the report unchanged.
    pub fn into_result(mut self) -> Result<RunReport> {
        let RunOutcome::Aborted { task } = &self.outcome else {
            return Ok(self);
        };
        let task = task.clone();

        let source = self
            .tasks
            .iter_mut()
            .find(|t| t.name == task)
            .and_then(|t| t.error.take())
            .unwrap_or_else(|| anyhow::anyhow!("task '{task}' failed"));

        Err(BuildGraphError::ActionFailure { task, source })
    }
}

impl fmt::Display for RunReport {
    /// Summary table of the scheduled tasks.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .order
            .iter()
            .map(|n| n.len())
            .max()
            .unwrap_or(0)
            .max("Target".len());
        let rule = "-".repeat(width + 26);

        writeln!(f, "{rule}")?;
        writeln!(f, "{:<width$}  {:<12}  {:>10}", "Target", "Status", "Duration")?;
        writeln!(f, "{rule}")?;

        let mut total = Duration::ZERO;
        for name in &self.order {
            let Some(task) = self.task(name) else {
                continue;
            };
            let duration = match task.duration {
                Some(d) => {
                    total += d;
                    format_duration(d)
                }
                None => "<skipped>".to_string(),
            };
            let duration = if task.status == TaskStatus::NotScheduled {
                String::new()
            } else {
                duration
            };
            writeln!(f, "{:<width$}  {:<12}  {:>10}", name, task.status, duration)?;
            if let Some(err) = &task.error {
                writeln!(f, "{:<width$}    {err:#}", "")?;
            }
        }

        writeln!(f, "{rule}")?;
        writeln!(f, "{:<width$}  {:<12}  {:>10}", "Total", "", format_duration(total))?;
        writeln!(f, "{rule}")?;

        match &self.outcome {
            RunOutcome::Succeeded => write!(f, "Build succeeded."),
            RunOutcome::CompletedWithFailures { failed } => write!(
                f,
                "Build completed with failures in best-effort targets: {}.",
                failed.join(", ")
            ),
            RunOutcome::Aborted { task } => write!(f, "Build failed in target '{task}'."),
        }
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 {
        format!("{}:{:02}", secs / 60, secs % 60)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
