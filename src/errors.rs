// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::dag::TaskName;

#[derive(Error, Debug)]
pub enum BuildGraphError {
    #[error("Task already registered: {0}")]
    DuplicateTask(TaskName),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency {
        task: TaskName,
        dependency: TaskName,
    },

    #[error("Cycle detected in task graph: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<TaskName> },

    #[error("Unknown target: {0}")]
    UnknownTarget(TaskName),

    #[error("No targets requested and no default target configured")]
    NoTargets,

    #[error("Task '{task}' failed: {source}")]
    ActionFailure {
        task: TaskName,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildGraphError>;
