// src/engine/mod.rs

//! Execution engine.
//!
//! - [`context`] holds the explicit per-run state handed to guards and
//!   actions.
//! - [`executor`] walks a resolved plan one task at a time.
//! - [`status`] holds per-task statuses and the final [`RunReport`].

pub mod context;
pub mod executor;
pub mod status;

pub use context::RunContext;
pub use executor::Executor;
pub use status::{RunOutcome, RunReport, SkipReason, TaskReport, TaskStatus};
