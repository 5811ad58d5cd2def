// tests/common/mod.rs

//! Shared helpers for integration tests: temporary robot trees, module
//! trees, and recipe files.

use mason::{parse_recipe_file, PackageDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A scratch environment: robot search path, module tree, install root
pub struct TestEnv {
    pub temp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("robot")).unwrap();
        fs::create_dir_all(temp.path().join("modules")).unwrap();
        fs::create_dir_all(temp.path().join("software")).unwrap();
        Self { temp }
    }

    pub fn robot(&self) -> PathBuf {
        self.temp.path().join("robot")
    }

    pub fn modules(&self) -> PathBuf {
        self.temp.path().join("modules")
    }

    pub fn software(&self) -> PathBuf {
        self.temp.path().join("software")
    }

    /// Write a recipe into the robot tree and return its path
    pub fn add_recipe(&self, content: &str) -> PathBuf {
        let (name, version) = recipe_identity(content);
        let path = self.robot().join(format!("{}-{}.toml", name, version));
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a recipe into a nested robot subdirectory
    pub fn add_recipe_under(&self, subdir: &str, content: &str) -> PathBuf {
        let (name, version) = recipe_identity(content);
        let dir = self.robot().join(subdir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}-{}.toml", name, version));
        fs::write(&path, content).unwrap();
        path
    }

    /// Load a recipe file into a descriptor the way the CLI does
    pub fn descriptor(&self, path: &Path) -> PackageDescriptor {
        PackageDescriptor::from_recipe(parse_recipe_file(path).unwrap())
    }
}

/// Pull (name, full version) out of recipe TOML for file naming
fn recipe_identity(content: &str) -> (String, String) {
    let recipe = mason::parse_recipe(content).unwrap();
    let (name, version) = recipe.identity();
    (name, version)
}

/// A minimal recipe that installs a single marker file
pub fn touch_recipe(name: &str, version: &str, deps: &[(&str, &str)]) -> String {
    let mut content = format!(
        r#"[package]
name = "{name}"
version = "{version}"

[build]
install = "mkdir -p %(prefix)s/bin && touch %(prefix)s/bin/{name}"

[sanity]
files = ["bin/{name}"]
"#
    );
    for (dep_name, dep_version) in deps {
        content.push_str(&format!(
            "\n[[dependencies]]\nname = \"{}\"\nversion = \"{}\"\n",
            dep_name, dep_version
        ));
    }
    content
}
