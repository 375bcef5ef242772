// src/config/mod.rs

//! Configuration loading and validation for buildgraph.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate references, placeholders and DAG correctness (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{config_root_dir, load_and_validate, load_from_path, load_from_str};
pub use model::{ConfigFile, ConfigSection, GuardConfig, ParamSpec, RawConfigFile, TaskConfig};
pub use validate::validate_config;
