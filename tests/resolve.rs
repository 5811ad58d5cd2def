// tests/resolve.rs

//! Integration tests for dependency resolution against a real robot tree
//! on disk and a real module tree, end to end through the public API.

mod common;

use common::{touch_recipe, TestEnv};
use mason::{resolve, Error, ModuleTree, SearchPath};

#[test]
fn test_no_dependency_passthrough() {
    let env = TestEnv::new();
    let path = env.add_recipe(&touch_recipe("name", "version", &[]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let order = resolve(&[top.clone()], &oracle, &SearchPath::new(), None).unwrap();
    assert_eq!(order, vec![top]);
}

#[test]
fn test_dependency_found_on_robot_path() {
    let env = TestEnv::new();
    env.add_recipe(&touch_recipe("gzip", "1.4", &[]));
    let path = env.add_recipe(&touch_recipe("app", "1.0", &[("gzip", "1.4")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let order = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap();
    assert_eq!(order.len(), 2);
    assert_eq!(order[0].name, "gzip");
    assert_eq!(order[1].name, "app");
}

#[test]
fn test_linear_chain_orders_leaves_first() {
    let env = TestEnv::new();
    env.add_recipe(&touch_recipe("C", "1.0", &[]));
    env.add_recipe(&touch_recipe("B", "1.0", &[("C", "1.0")]));
    let path = env.add_recipe(&touch_recipe("A", "1.0", &[("B", "1.0")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let order = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap();
    let names: Vec<&str> = order.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[test]
fn test_diamond_collapses_to_single_node() {
    let env = TestEnv::new();
    env.add_recipe(&touch_recipe("D", "1.0", &[]));
    env.add_recipe(&touch_recipe("B", "1.0", &[("D", "1.0")]));
    env.add_recipe(&touch_recipe("C", "1.0", &[("D", "1.0")]));
    let path = env.add_recipe(&touch_recipe("A", "1.0", &[("B", "1.0"), ("C", "1.0")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let order = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap();
    assert_eq!(order.len(), 4);
    assert_eq!(order.iter().filter(|d| d.name == "D").count(), 1);

    let pos = |name: &str| order.iter().position(|d| d.name == name).unwrap();
    assert!(pos("D") < pos("B") && pos("D") < pos("C"));
    assert!(pos("B") < pos("A") && pos("C") < pos("A"));
}

#[test]
fn test_available_module_short_circuits_lookup() {
    let env = TestEnv::new();
    // no gzip recipe anywhere; the module tree alone satisfies it
    let oracle = ModuleTree::new(env.modules());
    oracle.register("gzip", "1.4").unwrap();

    let path = env.add_recipe(&touch_recipe("app", "1.0", &[("gzip", "1.4")]));
    let top = env.descriptor(&path);

    let order = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap();
    assert_eq!(order.len(), 1);
    assert_eq!(order[0].name, "app");
    assert!(order[0].dependencies.is_empty());
}

#[test]
fn test_missing_recipe_names_the_dependency() {
    let env = TestEnv::new();
    let path = env.add_recipe(&touch_recipe("app", "1.0", &[("gzip", "1.4")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let err = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap_err();
    match err {
        Error::MissingRecipe { name, version } => {
            assert_eq!(name, "gzip");
            assert_eq!(version, "1.4");
        }
        other => panic!("expected MissingRecipe, got {:?}", other),
    }
}

#[test]
fn test_missing_recipe_without_search_path() {
    let env = TestEnv::new();
    env.add_recipe(&touch_recipe("gzip", "1.4", &[]));
    let path = env.add_recipe(&touch_recipe("app", "1.0", &[("gzip", "1.4")]));
    let top = env.descriptor(&path);

    // the recipe exists on disk, but without a search path it must not be
    // looked up
    let oracle = ModuleTree::new(env.modules());
    let err = resolve(&[top], &oracle, &SearchPath::new(), None).unwrap_err();
    assert!(matches!(err, Error::MissingRecipe { .. }));
}

#[test]
fn test_cycle_is_unresolvable() {
    let env = TestEnv::new();
    env.add_recipe(&touch_recipe("B", "1.0", &[("A", "1.0")]));
    let path = env.add_recipe(&touch_recipe("A", "1.0", &[("B", "1.0")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let err = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap_err();
    assert!(matches!(err, Error::UnresolvableDependencies { .. }));
}

#[test]
fn test_resolution_is_deterministic() {
    let env = TestEnv::new();
    env.add_recipe(&touch_recipe("D", "1.0", &[]));
    env.add_recipe(&touch_recipe("B", "1.0", &[("D", "1.0")]));
    env.add_recipe(&touch_recipe("C", "1.0", &[("D", "1.0")]));
    let path = env.add_recipe(&touch_recipe("A", "1.0", &[("B", "1.0"), ("C", "1.0")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let first = resolve(
        &[top.clone()],
        &oracle,
        &SearchPath::new(),
        Some(&env.robot()),
    )
    .unwrap();
    let second = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_idempotent_re_resolution() {
    let env = TestEnv::new();
    let oracle = ModuleTree::new(env.modules());
    oracle.register("GCC", "4.6.3").unwrap();
    oracle.register("zlib", "1.2.8").unwrap();

    let first = env.add_recipe(&touch_recipe("gzip", "1.4", &[("GCC", "4.6.3")]));
    let second = env.add_recipe(&touch_recipe(
        "bzip2",
        "1.0.6",
        &[("GCC", "4.6.3"), ("zlib", "1.2.8")],
    ));
    let tops = [env.descriptor(&first), env.descriptor(&second)];

    let order = resolve(&tops, &oracle, &SearchPath::new(), None).unwrap();
    let names: Vec<&str> = order.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["gzip", "bzip2"]);
    assert!(order.iter().all(|d| d.dependencies.is_empty()));
}

#[test]
fn test_dependency_in_requested_build_set() {
    let env = TestEnv::new();
    let app = env.add_recipe(&touch_recipe("app", "1.0", &[("gzip", "1.4")]));
    let gzip = env.add_recipe(&touch_recipe("gzip", "1.4", &[]));
    let tops = [env.descriptor(&app), env.descriptor(&gzip)];

    // no search path needed: gzip is already part of the build set
    let oracle = ModuleTree::new(env.modules());
    let order = resolve(&tops, &oracle, &SearchPath::new(), None).unwrap();
    let names: Vec<&str> = order.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["gzip", "app"]);
}

#[test]
fn test_suffixed_dependency_pulls_in_its_toolchain() {
    // The classic robot scenario: depending on gzip-1.4-GCC-4.6.3 pulls in
    // the gzip recipe built with that toolchain, whose own dependency on
    // GCC lands first in the order.
    let env = TestEnv::new();
    env.add_recipe_under("g/GCC", &touch_recipe("GCC", "4.6.3", &[]));
    env.add_recipe_under(
        "g/gzip",
        r#"[package]
name = "gzip"
version = "1.4"
toolchain = "GCC-4.6.3"

[build]
install = "mkdir -p %(prefix)s/bin && touch %(prefix)s/bin/gzip"

[[dependencies]]
name = "GCC"
version = "4.6.3"
"#,
    );
    let path = env.add_recipe(
        r#"[package]
name = "app"
version = "1.0"

[build]
install = "true"

[[dependencies]]
name = "gzip"
version = "1.4"
suffix = "GCC-4.6.3"
"#,
    );
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let order = resolve(&[top], &oracle, &SearchPath::new(), Some(&env.robot())).unwrap();
    let names: Vec<String> = order.iter().map(|d| d.to_string()).collect();
    assert_eq!(names, vec!["GCC-4.6.3", "gzip-1.4-GCC-4.6.3", "app-1.0"]);
}

#[test]
fn test_unreadable_search_path_is_an_error() {
    let env = TestEnv::new();
    let path = env.add_recipe(&touch_recipe("app", "1.0", &[("gzip", "1.4")]));
    let top = env.descriptor(&path);

    let oracle = ModuleTree::new(env.modules());
    let missing_dir = env.temp.path().join("no-such-robot");
    let err = resolve(&[top], &oracle, &SearchPath::new(), Some(&missing_dir)).unwrap_err();
    // distinct from MissingRecipe: the collaborator failed, it did not
    // report "not found"
    assert!(matches!(err, Error::IoError(_)));
}
