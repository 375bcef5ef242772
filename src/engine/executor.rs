// src/engine/executor.rs

//! Sequential executor.
//!
//! Walks an [`ExecutionPlan`] front to back on the calling thread. There are
//! no suspension points: each action runs to completion before the next
//! task is considered.

use std::time::Instant;

use tracing::{error, info, warn};

use crate::dag::{resolve, ExecutionPlan, TaskRegistry};
use crate::engine::context::RunContext;
use crate::engine::status::{RunOutcome, RunReport, SkipReason, TaskReport, TaskStatus};
use crate::errors::Result;

/// Runs resolved plans against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Executor<'r> {
    registry: &'r TaskRegistry,
}

impl<'r> Executor<'r> {
    pub fn new(registry: &'r TaskRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `targets` and execute the resulting plan.
    ///
    /// Resolution errors are returned before any action runs.
    pub fn run<S: AsRef<str>>(&self, targets: &[S], ctx: RunContext) -> Result<RunReport> {
        let plan = resolve(self.registry, targets)?;
        Ok(self.execute(&plan, ctx))
    }

    /// Execute an already resolved plan.
    ///
    /// Per task, in order:
    /// - skipped on request or when the guard is false (dependents still run);
    /// - otherwise the action runs, `Succeeded` or `Failed`;
    /// - a failure of a task that is not best-effort aborts the run, leaving
    ///   the rest `NotScheduled`.
    pub fn execute(&self, plan: &ExecutionPlan, mut ctx: RunContext) -> RunReport {
        let mut reports: Vec<TaskReport> = self
            .registry
            .iter()
            .map(|t| TaskReport::not_scheduled(t.name(), t.is_best_effort()))
            .collect();

        let mut best_effort_failures = Vec::new();
        let mut aborted_by = None;

        for name in plan.order() {
            let (Some(idx), Some(task)) = (self.registry.index_of(name), self.registry.get(name))
            else {
                error!(task = %name, "planned task is not registered; stopping run");
                aborted_by = Some(name.clone());
                break;
            };
            let report = &mut reports[idx];

            if ctx.is_skip_requested(name) {
                info!(task = %name, "skipping task on request");
                report.status = TaskStatus::Skipped;
                report.skip_reason = Some(SkipReason::Requested);
                continue;
            }

            if !task.guard_allows(&ctx) {
                warn!(task = %name, "guard evaluated false; skipping task");
                report.status = TaskStatus::Skipped;
                report.skip_reason = Some(SkipReason::Guard);
                continue;
            }

            info!(task = %name, "running task");
            let started = Instant::now();
            let result = task.run_action(&mut ctx);
            report.duration = Some(started.elapsed());

            match result {
                Ok(()) => {
                    info!(task = %name, elapsed = ?report.duration, "task succeeded");
                    report.status = TaskStatus::Succeeded;
                    ctx.mark_succeeded(name);
                }
                Err(err) if task.is_best_effort() => {
                    warn!(
                        task = %name,
                        error = %format!("{err:#}"),
                        "best-effort task failed; continuing"
                    );
                    report.status = TaskStatus::Failed;
                    report.error = Some(err);
                    best_effort_failures.push(name.clone());
                }
                Err(err) => {
                    error!(
                        task = %name,
                        error = %format!("{err:#}"),
                        "task failed; aborting run"
                    );
                    report.status = TaskStatus::Failed;
                    report.error = Some(err);
                    aborted_by = Some(name.clone());
                    break;
                }
            }
        }

        let outcome = match aborted_by {
            Some(task) => RunOutcome::Aborted { task },
            None if best_effort_failures.is_empty() => RunOutcome::Succeeded,
            None => RunOutcome::CompletedWithFailures {
                failed: best_effort_failures,
            },
        };

        info!(outcome = ?outcome, "run finished");
        RunReport::new(plan.order().to_vec(), reports, outcome, ctx)
    }
}
