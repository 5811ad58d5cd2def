// src/modules/mod.rs

//! Module availability oracle
//!
//! The resolver never decides for itself whether a package is already
//! installed; it asks an oracle. The production oracle is a modulefiles
//! tree on disk (`<root>/<name>/<version>`), the same layout environment
//! module systems publish. Tests use the in-memory [`StaticModules`].
//!
//! The oracle is an explicit parameter to `resolve`; there is no
//! process-wide registry, so repeated or interleaved resolution runs cannot
//! interfere with each other.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Answers "is module (name, version) already installed/available?"
///
/// Implementations must be pure queries: no side effects, safe to call
/// repeatedly for the same key.
pub trait ModuleOracle {
    fn is_available(&self, name: &str, version: &str) -> bool;
}

/// Modulefiles tree on disk
///
/// A module (name, version) is available when `<root>/<name>/<version>`
/// exists, as either a file or a directory. The kitchen registers fresh
/// installs by creating an empty marker file; the marker's textual content
/// is not mason's concern.
#[derive(Debug, Clone)]
pub struct ModuleTree {
    root: PathBuf,
}

impl ModuleTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record a freshly installed module
    pub fn register(&self, name: &str, version: &str) -> Result<()> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)
            .map_err(|e| Error::IoError(format!("failed to create module dir {}: {}", dir.display(), e)))?;
        let marker = dir.join(version);
        fs::write(&marker, "")
            .map_err(|e| Error::IoError(format!("failed to write module marker {}: {}", marker.display(), e)))?;
        debug!("registered module {}/{}", name, version);
        Ok(())
    }

    /// List all (name, version) pairs in the tree, sorted
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();
        if !self.root.is_dir() {
            return Ok(entries);
        }
        for name_entry in fs::read_dir(&self.root)? {
            let name_entry = name_entry?;
            if !name_entry.file_type()?.is_dir() {
                continue;
            }
            let name = name_entry.file_name().to_string_lossy().into_owned();
            for ver_entry in fs::read_dir(name_entry.path())? {
                let ver_entry = ver_entry?;
                let version = ver_entry.file_name().to_string_lossy().into_owned();
                entries.push((name.clone(), version));
            }
        }
        entries.sort();
        Ok(entries)
    }
}

impl ModuleOracle for ModuleTree {
    fn is_available(&self, name: &str, version: &str) -> bool {
        let path = self.root.join(name).join(version);
        let hit = path.exists();
        debug!("module probe {}/{}: {}", name, version, if hit { "available" } else { "absent" });
        hit
    }
}

/// In-memory oracle for tests and scripted runs
#[derive(Debug, Clone, Default)]
pub struct StaticModules {
    entries: HashSet<(String, String)>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, version: &str) {
        self.entries.insert((name.to_string(), version.to_string()));
    }
}

impl<const N: usize> From<[(&str, &str); N]> for StaticModules {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut modules = Self::new();
        for (name, version) in pairs {
            modules.insert(name, version);
        }
        modules
    }
}

impl ModuleOracle for StaticModules {
    fn is_available(&self, name: &str, version: &str) -> bool {
        self.entries
            .contains(&(name.to_string(), version.to_string()))
    }
}
