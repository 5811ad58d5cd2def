// src/commands/avail.rs

//! Avail command - list modules the oracle reports available

use anyhow::{Context, Result};
use mason::{Config, ModuleTree};

pub fn cmd_avail(config: &Config) -> Result<()> {
    let tree = ModuleTree::new(&config.module_root);
    let modules = tree
        .list()
        .with_context(|| format!("failed to read module tree {}", config.module_root.display()))?;

    if modules.is_empty() {
        println!("No modules available under {}.", config.module_root.display());
        return Ok(());
    }

    println!("Available modules ({}):", modules.len());
    for (name, version) in modules {
        println!("  {}/{}", name, version);
    }

    Ok(())
}
