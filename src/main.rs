// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use mason::Config;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "mason")]
#[command(author, version, about = "Build orchestrator for scientific and HPC software", long_about = None)]
struct Cli {
    /// Path to a mason.toml configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a build order for the given recipes and install it
    Build {
        /// Top-level recipe files to build
        #[arg(required = true)]
        recipes: Vec<PathBuf>,
        /// Robot search path for dependency recipes
        #[arg(long)]
        robot: Option<PathBuf>,
        /// Install root (default: /opt/mason/software)
        #[arg(long)]
        prefix: Option<PathBuf>,
        /// Module tree root (default: /opt/mason/modules)
        #[arg(long)]
        modules: Option<PathBuf>,
        /// Stop after printing the resolved order
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve and print the build order without installing
    Plan {
        /// Top-level recipe files to plan for
        #[arg(required = true)]
        recipes: Vec<PathBuf>,
        /// Robot search path for dependency recipes
        #[arg(long)]
        robot: Option<PathBuf>,
        /// Module tree root (default: /opt/mason/modules)
        #[arg(long)]
        modules: Option<PathBuf>,
    },
    /// List modules the oracle reports available
    Avail {
        /// Module tree root (default: /opt/mason/modules)
        #[arg(long)]
        modules: Option<PathBuf>,
    },
    /// Parse and validate a recipe file
    Validate {
        /// Recipe file to check
        recipe: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            recipes,
            robot,
            prefix,
            modules,
            dry_run,
        } => {
            if let Some(robot) = robot {
                config.robot_path = Some(robot);
            }
            if let Some(prefix) = prefix {
                config.install_root = prefix;
            }
            if let Some(modules) = modules {
                config.module_root = modules;
            }
            commands::cmd_build(&recipes, &config, dry_run)
        }
        Commands::Plan { recipes, robot, modules } => {
            if let Some(robot) = robot {
                config.robot_path = Some(robot);
            }
            if let Some(modules) = modules {
                config.module_root = modules;
            }
            commands::cmd_plan(&recipes, &config)
        }
        Commands::Avail { modules } => {
            if let Some(modules) = modules {
                config.module_root = modules;
            }
            commands::cmd_avail(&config)
        }
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
    }
}
