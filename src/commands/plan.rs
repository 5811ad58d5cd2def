// src/commands/plan.rs

//! Plan command - print the resolved build order without installing

use anyhow::{Context, Result};
use mason::{resolve, Config, ModuleOracle, ModuleTree, SearchPath};
use std::path::PathBuf;

/// Resolve and print the build order
///
/// Top-level packages whose module is already available are reported as
/// such; everything the resolver emitted needs a build.
pub fn cmd_plan(recipe_paths: &[PathBuf], config: &Config) -> Result<()> {
    let descriptors = super::load_descriptors(recipe_paths)?;

    let oracle = ModuleTree::new(&config.module_root);
    let order = resolve(
        &descriptors,
        &oracle,
        &SearchPath::new(),
        config.robot_path.as_deref(),
    )
    .context("dependency resolution failed")?;

    if order.is_empty() {
        println!("Nothing to build.");
        return Ok(());
    }

    println!("Build order ({} package(s)):", order.len());
    for (index, descriptor) in order.iter().enumerate() {
        let status = if oracle.is_available(&descriptor.name, &descriptor.version) {
            "module available"
        } else {
            "build"
        };
        println!("  {:>3}. {} [{}]", index + 1, descriptor, status);
    }

    Ok(())
}
