#![cfg(unix)]

use buildgraph_test_utils::init_tracing;

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use buildgraph::config::{ConfigFile, GuardConfig};
use buildgraph::engine::{Executor, RunContext, RunOutcome, RunReport, TaskStatus};
use buildgraph::errors::BuildGraphError;
use buildgraph::exec::CommandFailed;
use buildgraph::fs::RealFileSystem;
use buildgraph::pipeline::{build_parameters, build_registry};
use buildgraph_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn run_in(
    root: &Path,
    cfg: &ConfigFile,
    targets: &[&str],
    skips: &[&str],
) -> Result<RunReport, Box<dyn Error>> {
    let registry = build_registry(cfg, root, Arc::new(RealFileSystem))?;
    let params = build_parameters(cfg, &[])?;
    let ctx = RunContext::new(params).with_skipped(skips.iter().copied());
    Ok(Executor::new(&registry).run(targets, ctx)?)
}

#[test]
fn command_sees_interpolated_parameters() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let cfg = ConfigFileBuilder::new()
        .with_param("configuration", Some("Release"))
        .with_task(
            TaskConfigBuilder::new("compile")
                .cmd("echo {configuration} > out.txt")
                .build(),
        )
        .build();

    let report = run_in(dir.path(), &cfg, &["compile"], &[])?;

    assert!(report.is_success());
    assert_eq!(fs::read_to_string(dir.path().join("out.txt"))?, "Release\n");
    Ok(())
}

#[test]
fn cwd_and_env_are_applied() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("sub"))?;

    let cfg = ConfigFileBuilder::new()
        .with_param("configuration", Some("Release"))
        .with_task(
            TaskConfigBuilder::new("compile")
                .cwd("sub")
                .env("BUILD_CONFIGURATION", "{configuration}")
                .cmd("echo $BUILD_CONFIGURATION > out.txt")
                .build(),
        )
        .build();

    run_in(dir.path(), &cfg, &["compile"], &[])?;

    assert_eq!(
        fs::read_to_string(dir.path().join("sub/out.txt"))?,
        "Release\n"
    );
    Ok(())
}

#[test]
fn env_values_can_use_root_and_item() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("a.src"), "")?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("stamp")
                .env("OUT", "{root}/out.txt")
                .cmd("echo hi > \"$OUT\"")
                .build(),
        )
        .with_task(
            TaskConfigBuilder::new("per-file")
                .foreach("*.src")
                .env("SOURCE", "{item}")
                .cmd("echo \"$SOURCE\" >> items.log")
                .build(),
        )
        .build();

    let report = run_in(dir.path(), &cfg, &["stamp", "per-file"], &[])?;

    assert!(report.is_success(), "{report}");
    assert_eq!(fs::read_to_string(dir.path().join("out.txt"))?, "hi\n");
    assert_eq!(fs::read_to_string(dir.path().join("items.log"))?, "a.src\n");
    Ok(())
}

#[test]
fn clean_dirs_empties_existing_and_creates_missing() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("artifacts/bin/nested"))?;
    fs::write(dir.path().join("artifacts/bin/old.dll"), "stale")?;
    fs::write(dir.path().join("artifacts/bin/nested/old.pdb"), "stale")?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("clean")
                .clean_dir("artifacts/bin")
                .clean_dir("artifacts/test-results")
                .build(),
        )
        .build();

    let report = run_in(dir.path(), &cfg, &["clean"], &[])?;

    assert!(report.is_success());
    assert_eq!(fs::read_dir(dir.path().join("artifacts/bin"))?.count(), 0);
    assert!(dir.path().join("artifacts/test-results").is_dir());
    Ok(())
}

#[test]
fn foreach_runs_once_per_match_in_sorted_order() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir_all(dir.path().join("b/tests"))?;
    fs::create_dir_all(dir.path().join("a"))?;
    fs::write(dir.path().join("b/tests/B.Tests.Unit.csproj"), "")?;
    fs::write(dir.path().join("a/A.Tests.Unit.csproj"), "")?;
    fs::write(dir.path().join("a/A.csproj"), "")?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("unit-tests")
                .foreach("**/*.Tests.Unit.csproj")
                .cmd("echo {item} >> items.txt")
                .build(),
        )
        .build();

    run_in(dir.path(), &cfg, &["unit-tests"], &[])?;

    assert_eq!(
        fs::read_to_string(dir.path().join("items.txt"))?,
        "a/A.Tests.Unit.csproj\nb/tests/B.Tests.Unit.csproj\n"
    );
    Ok(())
}

#[test]
fn args_are_appended_only_after_the_named_task_succeeded() -> TestResult {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_task(TaskConfigBuilder::new("restore").cmd("true").build())
        .with_task(
            TaskConfigBuilder::new("compile")
                .depends_on("restore")
                .cmd("echo compile > compile.txt")
                .args_if_succeeded("restore", "--no-restore")
                .build(),
        )
        .build();

    let dir = tempdir()?;
    run_in(dir.path(), &cfg, &["compile"], &[])?;
    assert_eq!(
        fs::read_to_string(dir.path().join("compile.txt"))?,
        "compile --no-restore\n"
    );

    let dir = tempdir()?;
    run_in(dir.path(), &cfg, &["compile"], &["restore"])?;
    assert_eq!(fs::read_to_string(dir.path().join("compile.txt"))?, "compile\n");
    Ok(())
}

#[test]
fn fallback_cmd_runs_when_cmd_fails() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("configure-feed")
                .cmd("echo add > attempts.txt; exit 3")
                .fallback_cmd("echo update >> attempts.txt")
                .build(),
        )
        .build();

    let report = run_in(dir.path(), &cfg, &["configure-feed"], &[])?;

    assert_eq!(
        report.status_of("configure-feed"),
        Some(TaskStatus::Succeeded)
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("attempts.txt"))?,
        "add\nupdate\n"
    );
    Ok(())
}

#[test]
fn failing_command_aborts_with_exit_code() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("compile")
                .cmd("echo 'error CS1002: ; expected' >&2; exit 7")
                .build(),
        )
        .with_task(
            TaskConfigBuilder::new("publish")
                .depends_on("compile")
                .cmd("echo publish > published.txt")
                .build(),
        )
        .build();

    let report = run_in(dir.path(), &cfg, &["publish"], &[])?;

    assert_eq!(
        report.outcome(),
        &RunOutcome::Aborted {
            task: "compile".to_string()
        }
    );
    assert!(!dir.path().join("published.txt").exists());

    match report.into_result() {
        Err(BuildGraphError::ActionFailure { task, source }) => {
            assert_eq!(task, "compile");
            let failed = source
                .downcast_ref::<CommandFailed>()
                .ok_or("expected CommandFailed")?;
            assert_eq!(failed.code, Some(7));
        }
        Err(e) => panic!("Expected ActionFailure, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    Ok(())
}

#[test]
fn best_effort_command_failure_keeps_going() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("integration-tests")
                .best_effort(true)
                .cmd("exit 1")
                .build(),
        )
        .with_task(
            TaskConfigBuilder::new("publish")
                .after("integration-tests")
                .cmd("echo publish > published.txt")
                .build(),
        )
        .build();

    let report = run_in(dir.path(), &cfg, &["integration-tests", "publish"], &[])?;

    assert_eq!(
        report.outcome(),
        &RunOutcome::CompletedWithFailures {
            failed: vec!["integration-tests".to_string()]
        }
    );
    assert!(dir.path().join("published.txt").exists());
    Ok(())
}

fn guarded(name: &str, guard: GuardConfig) -> buildgraph::config::TaskConfig {
    TaskConfigBuilder::new(name)
        .cmd("true")
        .only_when(guard)
        .build()
}

#[test]
fn param_equals_guard() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let cfg = ConfigFileBuilder::new()
        .with_param("configuration", Some("Release"))
        .with_task(guarded(
            "sign",
            GuardConfig {
                param_equals: BTreeMap::from([("configuration".to_string(), "Release".to_string())]),
                ..GuardConfig::default()
            },
        ))
        .with_task(guarded(
            "debug-symbols",
            GuardConfig {
                param_equals: BTreeMap::from([("configuration".to_string(), "Debug".to_string())]),
                ..GuardConfig::default()
            },
        ))
        .build();

    let report = run_in(dir.path(), &cfg, &["sign", "debug-symbols"], &[])?;

    assert_eq!(report.status_of("sign"), Some(TaskStatus::Succeeded));
    assert_eq!(report.status_of("debug-symbols"), Some(TaskStatus::Skipped));
    Ok(())
}

#[test]
fn env_set_guard() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let cfg = ConfigFileBuilder::new()
        .with_task(guarded(
            "with-path",
            GuardConfig {
                env_set: vec!["PATH".to_string()],
                ..GuardConfig::default()
            },
        ))
        .with_task(guarded(
            "with-missing-var",
            GuardConfig {
                env_set: vec!["BUILDGRAPH_TEST_VARIABLE_THAT_IS_NEVER_SET".to_string()],
                ..GuardConfig::default()
            },
        ))
        .build();

    let report = run_in(dir.path(), &cfg, &["with-path", "with-missing-var"], &[])?;

    assert_eq!(report.status_of("with-path"), Some(TaskStatus::Succeeded));
    assert_eq!(report.status_of("with-missing-var"), Some(TaskStatus::Skipped));
    Ok(())
}

fn restore_and(name: &str, guard: GuardConfig) -> ConfigFile {
    ConfigFileBuilder::new()
        .with_task(TaskConfigBuilder::new("restore").cmd("true").build())
        .with_task(
            TaskConfigBuilder::new(name)
                .after("restore")
                .cmd("true")
                .only_when(guard)
                .build(),
        )
        .build()
}

#[test]
fn succeeded_guard() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let cfg = restore_and(
        "compile-no-restore",
        GuardConfig {
            succeeded: vec!["restore".to_string()],
            ..GuardConfig::default()
        },
    );
    let targets = ["restore", "compile-no-restore"];

    let report = run_in(dir.path(), &cfg, &targets, &[])?;
    assert_eq!(report.status_of("compile-no-restore"), Some(TaskStatus::Succeeded));

    let report = run_in(dir.path(), &cfg, &targets, &["restore"])?;
    assert_eq!(report.status_of("compile-no-restore"), Some(TaskStatus::Skipped));
    Ok(())
}

#[test]
fn not_succeeded_guard() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let cfg = restore_and(
        "implicit-restore",
        GuardConfig {
            not_succeeded: vec!["restore".to_string()],
            ..GuardConfig::default()
        },
    );
    let targets = ["restore", "implicit-restore"];

    let report = run_in(dir.path(), &cfg, &targets, &[])?;
    assert_eq!(report.status_of("implicit-restore"), Some(TaskStatus::Skipped));

    let report = run_in(dir.path(), &cfg, &targets, &["restore"])?;
    assert_eq!(report.status_of("implicit-restore"), Some(TaskStatus::Succeeded));
    Ok(())
}
