// src/lib.rs

//! Mason Build Orchestrator
//!
//! Build orchestrator for scientific and HPC software stacks: given a target
//! package and its declared dependencies, mason determines an installation
//! order, builds each package exactly once, and skips packages already
//! available as environment modules.
//!
//! # Architecture
//!
//! - Recipes: TOML build specifications located on a robot-style search path
//! - Resolver: fixed-point expansion + drain over the dependency graph
//! - Oracle: the already-available-modules lookup, queried before any build
//! - Kitchen: sequential execution of version-gated install steps
//! - Blocks: per-family install behavior as plain data+function records

pub mod blocks;
pub mod config;
mod error;
pub mod kitchen;
pub mod modules;
pub mod progress;
pub mod recipe;
pub mod resolver;
pub mod version;

pub use blocks::{BuildStep, PackageKind, SanityCheck};
pub use config::Config;
pub use error::{Error, Result};
pub use kitchen::{BuildReport, Kitchen, KitchenConfig};
pub use modules::{ModuleOracle, ModuleTree, StaticModules};
pub use progress::{CliProgress, LogProgress, ProgressStyle, ProgressTracker, SilentProgress};
pub use recipe::{
    parse_recipe, parse_recipe_file, validate_recipe, Recipe, RecipeLocator, SearchPath,
};
pub use resolver::{resolve, DependencyRef, PackageDescriptor};
pub use version::LooseVersion;
