// src/commands/mod.rs

//! Command handlers for the mason CLI

mod avail;
mod build;
mod plan;
mod validate;

pub use avail::cmd_avail;
pub use build::cmd_build;
pub use plan::cmd_plan;
pub use validate::cmd_validate;

use anyhow::{Context, Result};
use mason::{parse_recipe_file, validate_recipe, PackageDescriptor};
use std::path::PathBuf;

/// Parse and validate the top-level recipe files given on the command line
pub(crate) fn load_descriptors(recipe_paths: &[PathBuf]) -> Result<Vec<PackageDescriptor>> {
    let mut descriptors = Vec::with_capacity(recipe_paths.len());

    for path in recipe_paths {
        let recipe = parse_recipe_file(path)
            .with_context(|| format!("failed to parse recipe {}", path.display()))?;
        let warnings = validate_recipe(&recipe)
            .with_context(|| format!("invalid recipe {}", path.display()))?;
        for warning in warnings {
            println!("Warning: {}: {}", path.display(), warning);
        }
        descriptors.push(PackageDescriptor::from_recipe(recipe));
    }

    Ok(descriptors)
}
