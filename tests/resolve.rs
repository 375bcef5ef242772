use buildgraph::dag::{resolve, Task, TaskRegistry};
use buildgraph::errors::BuildGraphError;
use buildgraph_test_utils::init_tracing;

fn registry(tasks: Vec<Task>) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    for task in tasks {
        registry.register(task).unwrap();
    }
    registry
}

/// clean, restore(clean), compile(restore), unit(compile), publish(compile)
fn build_pipeline() -> TaskRegistry {
    registry(vec![
        Task::new("clean"),
        Task::new("restore").depends_on("clean"),
        Task::new("compile").depends_on("restore"),
        Task::new("unit").depends_on("compile"),
        Task::new("publish").depends_on("compile"),
    ])
}

#[test]
fn target_schedules_exactly_its_hard_closure() {
    init_tracing();

    let registry = build_pipeline();
    let plan = resolve(&registry, &["compile"]).unwrap();

    assert_eq!(plan.order(), ["clean", "restore", "compile"]);
    assert!(!plan.contains("unit"));
    assert!(!plan.contains("publish"));
    assert_eq!(plan.targets(), ["compile"]);
}

#[test]
fn shared_dependencies_are_scheduled_once() {
    init_tracing();

    let registry = build_pipeline();
    let plan = resolve(&registry, &["publish", "unit", "publish"]).unwrap();

    assert_eq!(plan.order(), ["clean", "restore", "compile", "unit", "publish"]);
    assert_eq!(plan.targets(), ["publish", "unit"]);
}

#[test]
fn ties_are_broken_by_registration_order() {
    init_tracing();

    let registry = registry(vec![
        Task::new("zeta"),
        Task::new("alpha"),
        Task::new("mid"),
        Task::new("all")
            .depends_on("mid")
            .depends_on("alpha")
            .depends_on("zeta"),
    ]);

    let plan = resolve(&registry, &["all"]).unwrap();
    assert_eq!(plan.order(), ["zeta", "alpha", "mid", "all"]);
}

#[test]
fn dependencies_registered_later_still_come_first() {
    init_tracing();

    let registry = registry(vec![
        Task::new("publish").depends_on("compile"),
        Task::new("compile"),
    ]);

    let plan = resolve(&registry, &["publish"]).unwrap();
    assert_eq!(plan.order(), ["compile", "publish"]);
}

#[test]
fn after_orders_but_does_not_include() {
    init_tracing();

    let registry = registry(vec![
        Task::new("publish").after("compile"),
        Task::new("compile"),
    ]);

    let alone = resolve(&registry, &["publish"]).unwrap();
    assert_eq!(alone.order(), ["publish"]);

    let both = resolve(&registry, &["publish", "compile"]).unwrap();
    assert_eq!(both.order(), ["compile", "publish"]);
}

#[test]
fn after_applies_to_tasks_pulled_in_by_other_targets() {
    init_tracing();

    let registry = registry(vec![
        Task::new("tests").after("compile"),
        Task::new("restore"),
        Task::new("compile").depends_on("restore"),
        Task::new("package").depends_on("compile"),
    ]);

    let plan = resolve(&registry, &["tests", "package"]).unwrap();
    assert_eq!(plan.order(), ["restore", "compile", "tests", "package"]);
}

#[test]
fn unknown_target_is_rejected() {
    init_tracing();

    let registry = build_pipeline();
    match resolve(&registry, &["deploy"]) {
        Err(BuildGraphError::UnknownTarget(name)) => assert_eq!(name, "deploy"),
        other => panic!("Expected UnknownTarget, got: {:?}", other),
    }
}

#[test]
fn empty_target_list_is_rejected() {
    init_tracing();

    let registry = build_pipeline();
    let targets: [&str; 0] = [];
    assert!(matches!(
        resolve(&registry, &targets),
        Err(BuildGraphError::NoTargets)
    ));
}

#[test]
fn unregistered_dependency_fails_resolution() {
    init_tracing();

    let registry = registry(vec![Task::new("x").depends_on("y")]);

    match resolve(&registry, &["x"]) {
        Err(BuildGraphError::UnknownDependency { task, dependency }) => {
            assert_eq!(task, "x");
            assert_eq!(dependency, "y");
        }
        other => panic!("Expected UnknownDependency, got: {:?}", other),
    }
}

#[test]
fn cycle_through_after_is_named() {
    init_tracing();

    // Hard edges alone are fine; the soft edge closes the loop once both
    // ends are scheduled.
    let registry = registry(vec![
        Task::new("a").after("b"),
        Task::new("b").depends_on("a"),
    ]);

    match resolve(&registry, &["b"]) {
        Err(BuildGraphError::CyclicDependency { cycle }) => {
            assert_eq!(cycle, vec!["a", "b", "a"]);
        }
        other => panic!("Expected CyclicDependency, got: {:?}", other),
    }

    let err = resolve(&registry, &["b"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cycle detected in task graph: a -> b -> a"
    );
}

#[test]
fn resolution_is_deterministic() {
    init_tracing();

    let first = resolve(&build_pipeline(), &["publish", "unit"]).unwrap();
    let second = resolve(&build_pipeline(), &["publish", "unit"]).unwrap();
    assert_eq!(first, second);
}
