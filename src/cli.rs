// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::params::parse_override;

/// Command-line arguments for `buildgraph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildgraph",
    version,
    about = "Run build targets in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Targets to run. Defaults to `[config].default_target`.
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Path to the config file (TOML).
    #[arg(
        long,
        value_name = "PATH",
        env = "BUILDGRAPH_CONFIG",
        default_value = "Buildgraph.toml"
    )]
    pub config: String,

    /// Override a declared parameter; may be repeated.
    #[arg(long = "param", short = 'p', value_name = "NAME=VALUE", value_parser = parse_override)]
    pub params: Vec<(String, String)>,

    /// Skip a scheduled target without running it; may be repeated.
    #[arg(long, value_name = "NAME")]
    pub skip: Vec<String>,

    /// List targets and their dependencies, then exit.
    #[arg(long)]
    pub list: bool,

    /// Resolve and print the execution order without running anything.
    #[arg(long, alias = "dry-run")]
    pub plan: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDGRAPH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
