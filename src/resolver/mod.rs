// src/resolver/mod.rs

//! Dependency resolution and build ordering
//!
//! This is the core of mason: given a list of top-level package
//! descriptors, expand the dependency graph by consulting the module
//! oracle and the recipe locator, then drain it into a linear build order
//! in which every dependency precedes its dependents.
//!
//! The algorithm is an explicit fixed-point loop, not recursion:
//!
//! 1. **Expansion**: for every pending descriptor, each dependency
//!    reference is checked against the oracle (available modules drop out
//!    of the list), then against the set of already-seen identities (a
//!    reference to a known node stays in place until that node drains),
//!    and only then against the recipe locator (a located recipe becomes a
//!    new pending node). A reference that survives all three is a missing
//!    dependency and fails the whole run.
//! 2. **Drain**: descriptors whose dependency list has emptied move into
//!    the resolved order, first-found first, which satisfies the matching
//!    references of everything still pending.
//!
//! Expansion and drain repeat until the pending set empties, or until a
//! full pass makes no progress (a cycle or a permanently blocked node).
//! Resolution either returns the complete order or fails with no partial
//! result; the state is owned by one `resolve` call and never shared.

use crate::error::{Error, Result};
use crate::modules::ModuleOracle;
use crate::recipe::{Recipe, RecipeLocator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Identity key: (name, full version including suffix)
type Key = (String, String);

/// A reference to a dependency: name, version, and an optional toolchain
/// suffix folded into the full version for identity and file naming
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyRef {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub suffix: Option<String>,
}

impl DependencyRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            suffix: None,
        }
    }

    pub fn with_suffix(
        name: impl Into<String>,
        version: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            suffix: Some(suffix.into()),
        }
    }

    /// Version string including the toolchain suffix, if any
    pub fn full_version(&self) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}-{}", self.version, suffix),
            None => self.version.clone(),
        }
    }

    /// The recipe file this reference resolves to on a search path
    pub fn recipe_file_name(&self) -> String {
        format!("{}-{}.toml", self.name, self.full_version())
    }

    fn key(&self) -> Key {
        (self.name.clone(), self.full_version())
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.full_version())
    }
}

/// A package's resolution-time record: identity plus the dependency
/// references not yet known to be satisfied
///
/// The dependency list shrinks as the oracle or the growing resolved order
/// satisfies references; the descriptor drains once the list is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<DependencyRef>,
    pub recipe: Recipe,
}

impl PackageDescriptor {
    /// Build a descriptor from a parsed recipe
    pub fn from_recipe(recipe: Recipe) -> Self {
        let (name, version) = recipe.identity();
        Self {
            name,
            version,
            dependencies: recipe.dependencies.clone(),
            recipe,
        }
    }

    fn key(&self) -> Key {
        (self.name.clone(), self.version.clone())
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// Resolve top-level descriptors into a linear build order
///
/// The caller's descriptors are deep-copied, never mutated. On success the
/// returned order contains every package that must be built, dependencies
/// before dependents, each exactly once, with all dependency lists empty.
/// On any failure no order is returned at all.
pub fn resolve(
    descriptors: &[PackageDescriptor],
    oracle: &dyn ModuleOracle,
    locator: &dyn RecipeLocator,
    search_path: Option<&Path>,
) -> Result<Vec<PackageDescriptor>> {
    let mut pending: Vec<PackageDescriptor> = descriptors.to_vec();
    let mut seen: HashSet<Key> = pending.iter().map(PackageDescriptor::key).collect();
    let mut resolved: Vec<PackageDescriptor> = Vec::new();
    let mut resolved_keys: HashSet<Key> = HashSet::new();

    while !pending.is_empty() {
        let expanded = expand(&mut pending, &mut seen, oracle, locator, search_path)?;
        let drained = drain(&mut pending, &mut resolved, &mut resolved_keys);

        if !expanded && drained == 0 && !pending.is_empty() {
            // A full pass moved nothing: the remaining descriptors block
            // each other. Report the first as representative.
            let blocked = &pending[0];
            let waiting_on = blocked
                .dependencies
                .first()
                .map(ToString::to_string)
                .unwrap_or_default();
            return Err(Error::UnresolvableDependencies {
                blocked: blocked.to_string(),
                waiting_on,
            });
        }
    }

    info!("resolved build order for {} package(s)", resolved.len());
    Ok(resolved)
}

/// One expansion pass over every pending descriptor
///
/// Returns whether anything changed (a reference satisfied by the oracle,
/// or a new node added from a located recipe).
fn expand(
    pending: &mut Vec<PackageDescriptor>,
    seen: &mut HashSet<Key>,
    oracle: &dyn ModuleOracle,
    locator: &dyn RecipeLocator,
    search_path: Option<&Path>,
) -> Result<bool> {
    let mut changed = false;
    let mut i = 0;

    while i < pending.len() {
        let mut located: Vec<PackageDescriptor> = Vec::new();

        let desc = &mut pending[i];
        let mut j = 0;
        while j < desc.dependencies.len() {
            let dep = &desc.dependencies[j];

            if oracle.is_available(&dep.name, &dep.full_version()) {
                debug!("{} satisfied by available module", dep);
                desc.dependencies.remove(j);
                changed = true;
                continue;
            }

            if seen.contains(&dep.key()) {
                // Known node; the reference resolves once that node drains
                j += 1;
                continue;
            }

            match locator.find(dep, search_path)? {
                Some(recipe) => {
                    seen.insert(dep.key());
                    let node = PackageDescriptor::from_recipe(recipe);
                    debug!("expanded {} from recipe", node);
                    located.push(node);
                    changed = true;
                    j += 1;
                }
                None => {
                    return Err(Error::MissingRecipe {
                        name: dep.name.clone(),
                        version: dep.full_version(),
                    });
                }
            }
        }

        pending.extend(located);
        i += 1;
    }

    Ok(changed)
}

/// Drain every descriptor whose dependency list has emptied, in stable
/// first-found order, until a sweep moves nothing
fn drain(
    pending: &mut Vec<PackageDescriptor>,
    resolved: &mut Vec<PackageDescriptor>,
    resolved_keys: &mut HashSet<Key>,
) -> usize {
    let mut count = 0;

    loop {
        // A reference to something already in the resolved order is
        // satisfied: it appears earlier in the output.
        for desc in pending.iter_mut() {
            desc.dependencies
                .retain(|dep| !resolved_keys.contains(&dep.key()));
        }

        let Some(pos) = pending.iter().position(|d| d.dependencies.is_empty()) else {
            break;
        };
        let done = pending.remove(pos);
        debug!("drained {} into the build order", done);
        resolved_keys.insert(done.key());
        resolved.push(done);
        count += 1;
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::StaticModules;
    use crate::recipe::parse_recipe;
    use std::cell::RefCell;

    /// In-memory locator that records every reference it is asked about
    #[derive(Default)]
    struct StubLocator {
        recipes: Vec<Recipe>,
        queried: RefCell<Vec<String>>,
    }

    impl StubLocator {
        fn with(recipes: Vec<Recipe>) -> Self {
            Self {
                recipes,
                queried: RefCell::new(Vec::new()),
            }
        }

        fn queried(&self) -> Vec<String> {
            self.queried.borrow().clone()
        }
    }

    impl RecipeLocator for StubLocator {
        fn find(&self, dep: &DependencyRef, search_path: Option<&Path>) -> Result<Option<Recipe>> {
            self.queried.borrow_mut().push(dep.to_string());
            if search_path.is_none() {
                return Ok(None);
            }
            Ok(self
                .recipes
                .iter()
                .find(|r| r.identity() == (dep.name.clone(), dep.full_version()))
                .cloned())
        }
    }

    fn recipe(name: &str, version: &str, deps: &[(&str, &str)]) -> Recipe {
        let mut content = format!("[package]\nname = \"{}\"\nversion = \"{}\"\n", name, version);
        for (dep_name, dep_version) in deps {
            content.push_str(&format!(
                "\n[[dependencies]]\nname = \"{}\"\nversion = \"{}\"\n",
                dep_name, dep_version
            ));
        }
        parse_recipe(&content).unwrap()
    }

    fn descriptor(name: &str, version: &str, deps: &[(&str, &str)]) -> PackageDescriptor {
        PackageDescriptor::from_recipe(recipe(name, version, deps))
    }

    fn search_path() -> Option<&'static Path> {
        Some(Path::new("/robot"))
    }

    #[test]
    fn test_no_dependency_passthrough() {
        let top = descriptor("name", "version", &[]);
        let oracle = StaticModules::new();
        let locator = StubLocator::default();

        let order = resolve(&[top.clone()], &oracle, &locator, None).unwrap();
        assert_eq!(order, vec![top]);
        assert!(locator.queried().is_empty());
    }

    #[test]
    fn test_linear_chain() {
        let oracle = StaticModules::new();
        let locator = StubLocator::with(vec![
            recipe("B", "1.0", &[("C", "1.0")]),
            recipe("C", "1.0", &[]),
        ]);
        let top = descriptor("A", "1.0", &[("B", "1.0")]);

        let order = resolve(&[top], &oracle, &locator, search_path()).unwrap();
        let names: Vec<&str> = order.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
        assert!(order.iter().all(|d| d.dependencies.is_empty()));
    }

    #[test]
    fn test_diamond_collapse() {
        let oracle = StaticModules::new();
        let locator = StubLocator::with(vec![
            recipe("B", "1.0", &[("D", "1.0")]),
            recipe("C", "1.0", &[("D", "1.0")]),
            recipe("D", "1.0", &[]),
        ]);
        let top = descriptor("A", "1.0", &[("B", "1.0"), ("C", "1.0")]);

        let order = resolve(&[top], &oracle, &locator, search_path()).unwrap();
        assert_eq!(order.len(), 4, "diamond must collapse to one D node");

        let pos = |name: &str| order.iter().position(|d| d.name == name).unwrap();
        assert!(pos("D") < pos("B"));
        assert!(pos("D") < pos("C"));
        assert!(pos("B") < pos("A"));
        assert!(pos("C") < pos("A"));
        assert_eq!(order.iter().filter(|d| d.name == "D").count(), 1);
    }

    #[test]
    fn test_oracle_short_circuit() {
        let oracle = StaticModules::from([("gzip", "1.4")]);
        let locator = StubLocator::default();
        let top = descriptor("A", "1.0", &[("gzip", "1.4")]);

        let order = resolve(&[top], &oracle, &locator, search_path()).unwrap();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].name, "A");
        assert!(
            locator.queried().is_empty(),
            "available module must never reach the locator"
        );
    }

    #[test]
    fn test_missing_recipe_failure() {
        let oracle = StaticModules::new();
        let locator = StubLocator::default();
        let top = descriptor("A", "1.0", &[("gzip", "1.4")]);

        let err = resolve(&[top], &oracle, &locator, search_path()).unwrap_err();
        match err {
            Error::MissingRecipe { name, version } => {
                assert_eq!(name, "gzip");
                assert_eq!(version, "1.4");
            }
            other => panic!("expected MissingRecipe, got {:?}", other),
        }
    }

    #[test]
    fn test_absent_search_path_means_not_found() {
        let oracle = StaticModules::new();
        let locator = StubLocator::with(vec![recipe("gzip", "1.4", &[])]);
        let top = descriptor("A", "1.0", &[("gzip", "1.4")]);

        let err = resolve(&[top], &oracle, &locator, None).unwrap_err();
        assert!(matches!(err, Error::MissingRecipe { .. }));
    }

    #[test]
    fn test_cycle_detection() {
        let oracle = StaticModules::new();
        let locator = StubLocator::with(vec![recipe("B", "1.0", &[("A", "1.0")])]);
        let top = descriptor("A", "1.0", &[("B", "1.0")]);

        let err = resolve(&[top], &oracle, &locator, search_path()).unwrap_err();
        match err {
            Error::UnresolvableDependencies { blocked, .. } => {
                assert_eq!(blocked, "A-1.0");
            }
            other => panic!("expected UnresolvableDependencies, got {:?}", other),
        }
    }

    #[test]
    fn test_determinism() {
        let oracle = StaticModules::new();
        let make_locator = || {
            StubLocator::with(vec![
                recipe("B", "1.0", &[("D", "1.0")]),
                recipe("C", "1.0", &[("D", "1.0")]),
                recipe("D", "1.0", &[]),
            ])
        };
        let tops = [
            descriptor("A", "1.0", &[("B", "1.0"), ("C", "1.0")]),
            descriptor("E", "2.0", &[("D", "1.0")]),
        ];

        let first = resolve(&tops, &oracle, &make_locator(), search_path()).unwrap();
        let second = resolve(&tops, &oracle, &make_locator(), search_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_idempotent_re_resolution() {
        // Everything is already available; the order passes through with
        // dependency lists emptied, input order preserved.
        let oracle = StaticModules::from([("GCC", "4.6.3"), ("zlib", "1.2.8")]);
        let locator = StubLocator::default();
        let tops = [
            descriptor("gzip", "1.4", &[("GCC", "4.6.3")]),
            descriptor("bzip2", "1.0.6", &[("GCC", "4.6.3"), ("zlib", "1.2.8")]),
        ];

        let order = resolve(&tops, &oracle, &locator, None).unwrap();
        let names: Vec<&str> = order.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["gzip", "bzip2"]);
        assert!(order.iter().all(|d| d.dependencies.is_empty()));
        assert!(locator.queried().is_empty());
    }

    #[test]
    fn test_dependency_present_in_build_set() {
        // The robot scenario: a dependency that is itself part of the
        // requested build set is not re-fetched and satisfies its parents
        // once drained.
        let oracle = StaticModules::new();
        let locator = StubLocator::default();
        let tops = [
            descriptor("app", "1.0", &[("gzip", "1.4")]),
            descriptor("gzip", "1.4", &[]),
        ];

        let order = resolve(&tops, &oracle, &locator, None).unwrap();
        let names: Vec<&str> = order.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["gzip", "app"]);
        assert!(locator.queried().is_empty());
        assert_eq!(order.iter().map(|d| d.dependencies.len()).sum::<usize>(), 0);
    }

    #[test]
    fn test_caller_input_not_mutated() {
        let oracle = StaticModules::from([("GCC", "4.6.3")]);
        let locator = StubLocator::default();
        let tops = [descriptor("gzip", "1.4", &[("GCC", "4.6.3")])];

        let order = resolve(&tops, &oracle, &locator, None).unwrap();
        assert!(order[0].dependencies.is_empty());
        // the caller's copy still lists its dependency
        assert_eq!(tops[0].dependencies.len(), 1);
    }

    #[test]
    fn test_divergent_versions_are_distinct_nodes() {
        // Same name at two versions: identity is (name, full version), so
        // both are expanded and both appear in the order.
        let oracle = StaticModules::new();
        let locator = StubLocator::with(vec![
            recipe("zlib", "1.2.5", &[]),
            recipe("zlib", "1.2.8", &[]),
        ]);
        let tops = [
            descriptor("A", "1.0", &[("zlib", "1.2.5")]),
            descriptor("B", "1.0", &[("zlib", "1.2.8")]),
        ];

        let order = resolve(&tops, &oracle, &locator, search_path()).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(order.iter().filter(|d| d.name == "zlib").count(), 2);
    }

    #[test]
    fn test_suffixed_dependency_identity() {
        let oracle = StaticModules::from([("gzip", "1.4-GCC-4.6.3")]);
        let locator = StubLocator::default();
        let top = PackageDescriptor::from_recipe(
            parse_recipe(
                r#"
[package]
name = "app"
version = "1.0"

[[dependencies]]
name = "gzip"
version = "1.4"
suffix = "GCC-4.6.3"
"#,
            )
            .unwrap(),
        );

        let order = resolve(&[top], &oracle, &locator, None).unwrap();
        assert_eq!(order.len(), 1);
        assert!(order[0].dependencies.is_empty());
    }

    #[test]
    fn test_locator_error_passes_through() {
        struct FailingLocator;
        impl RecipeLocator for FailingLocator {
            fn find(&self, _dep: &DependencyRef, _sp: Option<&Path>) -> Result<Option<Recipe>> {
                Err(Error::IoError("robot path unreadable".to_string()))
            }
        }

        let oracle = StaticModules::new();
        let top = descriptor("A", "1.0", &[("B", "1.0")]);
        let err = resolve(&[top], &oracle, &FailingLocator, search_path()).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
