// src/commands/build.rs

//! Build command - resolve a build order and install it

use anyhow::{Context, Result};
use mason::{
    resolve, CliProgress, Config, Kitchen, KitchenConfig, ModuleTree, ProgressStyle, SearchPath,
};
use std::path::PathBuf;
use tracing::info;

/// Resolve the build order for the given recipes and install it
///
/// Installation is strictly sequential in resolver order; later packages
/// may depend on what earlier ones put on disk. With `dry_run` the command
/// stops after printing the order.
pub fn cmd_build(recipe_paths: &[PathBuf], config: &Config, dry_run: bool) -> Result<()> {
    let descriptors = super::load_descriptors(recipe_paths)?;
    info!("resolving build order for {} top-level package(s)", descriptors.len());

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
    for descriptor in &order {
        println!("  {}", descriptor);
    }

    if dry_run {
        println!("Dry run, stopping before installation.");
        return Ok(());
    }

    let kitchen = Kitchen::new(KitchenConfig {
        install_root: config.install_root.clone(),
        module_root: config.module_root.clone(),
        timeout: config.timeout(),
        jobs: config.effective_jobs(),
        keep_workdir: false,
        dry_run: false,
    });

    let progress = CliProgress::new("Building", order.len() as u64, ProgressStyle::Bar);
    let reports = kitchen
        .install_all(&order, &progress)
        .context("installation failed")?;

    let built = reports.iter().filter(|r| !r.skipped).count();
    let skipped = reports.len() - built;
    let total_secs: f64 = reports.iter().map(|r| r.duration.as_secs_f64()).sum();

    println!(
        "Done: {} built, {} already available ({:.1}s).",
        built, skipped, total_secs
    );
    for report in reports.iter().filter(|r| !r.skipped) {
        println!("  {}-{} -> {}", report.name, report.version, report.prefix.display());
    }

    Ok(())
}
