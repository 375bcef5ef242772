// src/dag/mod.rs

//! Task graph: definition, registration and resolution.
//!
//! - [`task`] defines a single task: dependencies, guard, action.
//! - [`registry`] holds every registered task in registration order and
//!   rejects duplicates and cycles.
//! - [`resolve`] turns requested targets into a linear [`ExecutionPlan`].
//! - [`plan`] is the resolved order handed to the executor.
//! - [`cycle`] extracts a concrete cycle path for error reporting.

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

pub mod cycle;
pub mod plan;
pub mod registry;
pub mod resolve;
pub mod task;

pub use plan::ExecutionPlan;
pub use registry::TaskRegistry;
pub use resolve::resolve;
pub use task::{Action, Task};
