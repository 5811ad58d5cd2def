// src/recipe/parser.rs

//! Recipe file parsing and validation

use crate::error::{Error, Result};
use crate::recipe::format::Recipe;
use std::path::Path;

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("failed to read recipe file {}: {}", path.display(), e)))?;

    parse_recipe(&content)
}

/// Validate a recipe for completeness and correctness
///
/// Returns non-fatal warnings; hard violations (empty identity, a recipe
/// depending on itself) are errors.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ValidationError(
            "package name cannot be empty".to_string(),
        ));
    }
    if recipe.package.version.is_empty() {
        return Err(Error::ValidationError(
            "package version cannot be empty".to_string(),
        ));
    }

    // A recipe that lists its own identity would sit permanently blocked
    let own = recipe.identity();
    for dep in &recipe.dependencies {
        if dep.name.is_empty() || dep.version.is_empty() {
            return Err(Error::ValidationError(format!(
                "{}-{} has a dependency with an empty name or version",
                own.0, own.1
            )));
        }
        if (dep.name.clone(), dep.full_version()) == own {
            return Err(Error::ValidationError(format!(
                "{}-{} declares a dependency on itself",
                own.0, own.1
            )));
        }
    }

    if recipe.package.summary.is_none() {
        warnings.push("missing package summary".to_string());
    }

    // Family blocks bring their own commands; a generic recipe without an
    // install command will build nothing
    if recipe.package.block.is_none()
        && recipe.build.install.is_none()
        && recipe.build.make.is_none()
        && recipe.build.configure.is_none()
        && recipe.build.setup.is_none()
    {
        warnings.push("no build commands specified".to_string());
    }

    Ok(warnings)
}
