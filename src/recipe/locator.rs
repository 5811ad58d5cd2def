// src/recipe/locator.rs

//! Recipe lookup on the robot search path
//!
//! Given a dependency reference, the locator finds the recipe file named
//! `{name}-{version}[-{suffix}].toml` under the search directory. Three
//! probes run in order: the directory itself, the conventional
//! letter-bucketed tree (`g/gzip/gzip-1.4.toml`), then a full recursive
//! walk. "Not found" (`Ok(None)`) strictly means no candidate file exists;
//! an unreadable search path or an unparseable candidate is an error.

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use crate::recipe::parser::parse_recipe_file;
use crate::resolver::DependencyRef;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Locates and parses the recipe for a dependency reference
pub trait RecipeLocator {
    /// Returns `Ok(None)` when no matching recipe file exists under
    /// `search_path`, and immediately (without any lookup) when
    /// `search_path` is `None`.
    fn find(&self, dep: &DependencyRef, search_path: Option<&Path>) -> Result<Option<Recipe>>;
}

/// The production locator: probes a robot search directory on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchPath;

impl SearchPath {
    pub fn new() -> Self {
        Self
    }

    /// Candidate locations in probe order
    fn candidates(dir: &Path, dep: &DependencyRef) -> Vec<PathBuf> {
        let file_name = dep.recipe_file_name();
        let bucket = dep
            .name
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase().to_string())
            .unwrap_or_default();

        vec![
            dir.join(&file_name),
            dir.join(&bucket).join(&dep.name).join(&file_name),
        ]
    }

    /// Load a candidate and check it declares the identity we asked for
    fn load(path: &Path, dep: &DependencyRef) -> Result<Recipe> {
        let recipe = parse_recipe_file(path)?;
        if recipe.package.name != dep.name || recipe.full_version() != dep.full_version() {
            return Err(Error::ValidationError(format!(
                "recipe file {} declares {}-{}, expected {}-{}",
                path.display(),
                recipe.package.name,
                recipe.full_version(),
                dep.name,
                dep.full_version(),
            )));
        }
        Ok(recipe)
    }
}

impl RecipeLocator for SearchPath {
    fn find(&self, dep: &DependencyRef, search_path: Option<&Path>) -> Result<Option<Recipe>> {
        let Some(dir) = search_path else {
            debug!("no search path configured, treating {} as not found", dep);
            return Ok(None);
        };

        if !dir.is_dir() {
            return Err(Error::IoError(format!(
                "robot search path {} is not a readable directory",
                dir.display()
            )));
        }

        for candidate in Self::candidates(dir, dep) {
            if candidate.is_file() {
                debug!("located recipe for {} at {}", dep, candidate.display());
                return Self::load(&candidate, dep).map(Some);
            }
        }

        // Fall back to a full walk for robot trees with other layouts.
        // Sorted traversal keeps lookups deterministic when duplicate file
        // names exist in different subdirectories.
        let file_name = dep.recipe_file_name();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry
                .map_err(|e| Error::IoError(format!("failed to walk {}: {}", dir.display(), e)))?;
            if entry.file_type().is_file() && entry.file_name().to_string_lossy() == file_name {
                debug!("located recipe for {} at {}", dep, entry.path().display());
                return Self::load(entry.path(), dep).map(Some);
            }
        }

        debug!("no recipe for {} under {}", dep, dir.display());
        Ok(None)
    }
}
