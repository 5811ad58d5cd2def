// src/commands/validate.rs

//! Validate command - check a recipe file without building anything

use anyhow::{Context, Result};
use mason::{parse_recipe_file, validate_recipe, PackageKind};
use std::path::Path;

/// Parse a recipe, report problems, and show what an install would do
pub fn cmd_validate(recipe_path: &Path) -> Result<()> {
    println!("Reading recipe: {}", recipe_path.display());
    let recipe = parse_recipe_file(recipe_path)
        .with_context(|| format!("failed to parse recipe {}", recipe_path.display()))?;

    println!("Recipe: {} version {}", recipe.package.name, recipe.full_version());

    let warnings = validate_recipe(&recipe).context("recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    let kind = PackageKind::for_recipe(&recipe)
        .with_context(|| format!("invalid block tag in {}", recipe_path.display()))?;
    println!("Block: {}", kind);

    if !recipe.dependencies.is_empty() {
        println!("Dependencies:");
        for dep in &recipe.dependencies {
            println!("  {}", dep);
        }
    }

    let env = kind.module_env(&recipe);
    if !env.is_empty() {
        println!("Module environment guesses:");
        for (var, dirs) in env {
            println!("  {} <- {}", var, dirs.join(":"));
        }
    }
    for (var, rel) in kind.env_exports(&recipe) {
        if rel.is_empty() {
            println!("  {} = <prefix>", var);
        } else {
            println!("  {} = <prefix>/{}", var, rel);
        }
    }

    if warnings.is_empty() {
        println!("[OK] No issues found");
    } else {
        println!("[OK] {} warning(s)", warnings.len());
    }

    Ok(())
}
