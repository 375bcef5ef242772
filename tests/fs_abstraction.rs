use std::path::{Path, PathBuf};
use std::sync::Arc;

use buildgraph::engine::{Executor, RunContext};
use buildgraph::exec::{create_or_clean, expand_glob};
use buildgraph::fs::mock::MockFileSystem;
use buildgraph::fs::FileSystem;
use buildgraph::pipeline::build_registry;
use buildgraph_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

#[test]
fn test_create_or_clean_empties_directory() {
    let fs = MockFileSystem::new();
    fs.add_file("/repo/artifacts/bin/app.dll", b"old".to_vec());
    fs.add_file("/repo/artifacts/bin/sub/app.pdb", b"old".to_vec());
    fs.add_file("/repo/src/main.cs", b"class Program {}".to_vec());

    create_or_clean(&fs, Path::new("/repo/artifacts/bin")).unwrap();

    assert!(fs.is_dir(Path::new("/repo/artifacts/bin")));
    assert!(fs.read_dir(Path::new("/repo/artifacts/bin")).unwrap().is_empty());
    assert!(fs.exists(Path::new("/repo/src/main.cs")));
}

#[test]
fn test_create_or_clean_creates_missing_directory() {
    let fs = MockFileSystem::new();
    fs.add_dir("/repo");

    create_or_clean(&fs, Path::new("/repo/artifacts/coverage")).unwrap();

    assert!(fs.is_dir(Path::new("/repo/artifacts")));
    assert!(fs.is_dir(Path::new("/repo/artifacts/coverage")));
}

#[test]
fn test_create_or_clean_refuses_a_file() {
    let fs = MockFileSystem::new();
    fs.add_file("/repo/artifacts", b"not a dir".to_vec());

    let err = create_or_clean(&fs, Path::new("/repo/artifacts")).unwrap_err();
    assert!(err.to_string().contains("not a directory"), "{err}");
}

#[test]
fn test_expand_glob_matches_files_relative_to_root() {
    let fs = MockFileSystem::new();
    fs.add_file("/repo/tests/Api.Tests.Unit/Api.Tests.Unit.csproj", b"".to_vec());
    fs.add_file("/repo/tests/Core.Tests.Unit/Core.Tests.Unit.csproj", b"".to_vec());
    fs.add_file(
        "/repo/tests/Api.Tests.Integration/Api.Tests.Integration.csproj",
        b"".to_vec(),
    );
    fs.add_file("/repo/src/Api/Api.csproj", b"".to_vec());
    fs.add_file("/repo/.git/objects/x.Tests.Unit.csproj", b"".to_vec());

    let items = expand_glob(&fs, Path::new("/repo"), "**/*.Tests.Unit.csproj").unwrap();

    assert_eq!(
        items,
        vec![
            "tests/Api.Tests.Unit/Api.Tests.Unit.csproj",
            "tests/Core.Tests.Unit/Core.Tests.Unit.csproj",
        ]
    );
}

#[test]
fn test_expand_glob_star_stays_in_one_directory() {
    let fs = MockFileSystem::new();
    fs.add_file("/repo/a.csproj", b"".to_vec());
    fs.add_file("/repo/nested/b.csproj", b"".to_vec());

    let items = expand_glob(&fs, Path::new("/repo"), "*.csproj").unwrap();
    assert_eq!(items, vec!["a.csproj"]);
}

#[test]
fn test_expand_glob_rejects_bad_pattern() {
    let fs = MockFileSystem::new();
    fs.add_dir("/repo");

    assert!(expand_glob(&fs, Path::new("/repo"), "[unclosed").is_err());
}

#[test]
fn test_clean_only_task_runs_against_mock_fs() {
    let fs = MockFileSystem::new();
    fs.add_file("/repo/artifacts/test-results/old.trx", b"old".to_vec());

    let cfg = ConfigFileBuilder::new()
        .with_task(
            TaskConfigBuilder::new("clean")
                .clean_dir("artifacts/test-results")
                .clean_dir("artifacts/coverage")
                .build(),
        )
        .build();

    let registry =
        build_registry(&cfg, &PathBuf::from("/repo"), Arc::new(fs.clone())).unwrap();
    let report = Executor::new(&registry)
        .run(&["clean"], RunContext::default())
        .unwrap();

    assert!(report.is_success());
    assert_eq!(
        fs.paths(),
        vec![
            PathBuf::from("/"),
            PathBuf::from("/repo"),
            PathBuf::from("/repo/artifacts"),
            PathBuf::from("/repo/artifacts/coverage"),
            PathBuf::from("/repo/artifacts/test-results"),
        ]
    );
}
