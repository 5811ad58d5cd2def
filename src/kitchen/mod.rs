// src/kitchen/mod.rs

//! Kitchen: sequential execution of resolved build orders
//!
//! The kitchen takes descriptors in the exact order the resolver produced
//! and installs them one at a time. Later entries may depend on compilers
//! and libraries established by earlier installs, so there is no parallel
//! mode. Each package gets:
//!
//! 1. an availability re-check against the module tree (a package that
//!    became available since resolution is skipped, which makes re-runs of
//!    an interrupted order idempotent)
//! 2. its family's install steps, run through `sh -c` with a per-step
//!    timeout
//! 3. a sanity check of the files and directories the family expects under
//!    the install prefix
//! 4. a module registration so the oracle sees it on the next run

use crate::blocks::{BuildStep, PackageKind};
use crate::error::{Error, Result};
use crate::modules::{ModuleOracle, ModuleTree};
use crate::progress::ProgressTracker;
use crate::resolver::PackageDescriptor;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

/// Configuration for the kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Root under which packages install (`<root>/<name>/<version>`)
    pub install_root: PathBuf,
    /// Root of the modulefiles tree
    pub module_root: PathBuf,
    /// Timeout for a single build step
    pub timeout: Duration,
    /// Number of parallel jobs within one build
    pub jobs: u32,
    /// Keep the scratch work directory after completion (for debugging)
    pub keep_workdir: bool,
    /// Print what would run without running it
    pub dry_run: bool,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        Self {
            install_root: PathBuf::from("/opt/mason/software"),
            module_root: PathBuf::from("/opt/mason/modules"),
            timeout: Duration::from_secs(3600),
            jobs,
            keep_workdir: false,
            dry_run: false,
        }
    }
}

/// What happened for one package
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub name: String,
    pub version: String,
    /// True when the module tree already had this package
    pub skipped: bool,
    /// Phases that ran (or would run, in dry-run mode)
    pub steps: Vec<String>,
    pub prefix: PathBuf,
    pub started: DateTime<Utc>,
    pub duration: Duration,
}

/// The kitchen: where resolved build orders are carried out
pub struct Kitchen {
    config: KitchenConfig,
    modules: ModuleTree,
}

impl Kitchen {
    pub fn new(config: KitchenConfig) -> Self {
        let modules = ModuleTree::new(&config.module_root);
        Self { config, modules }
    }

    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    pub fn modules(&self) -> &ModuleTree {
        &self.modules
    }

    /// The prefix a descriptor installs into
    pub fn prefix_for(&self, descriptor: &PackageDescriptor) -> PathBuf {
        self.config
            .install_root
            .join(&descriptor.name)
            .join(&descriptor.version)
    }

    /// Install every package of a resolved order, strictly in order
    ///
    /// Aborts on the first failure; packages after the failed one are not
    /// attempted.
    pub fn install_all(
        &self,
        order: &[PackageDescriptor],
        progress: &dyn ProgressTracker,
    ) -> Result<Vec<BuildReport>> {
        progress.set_length(order.len() as u64);
        let mut reports = Vec::with_capacity(order.len());

        for descriptor in order {
            progress.set_message(&descriptor.to_string());
            match self.install(descriptor) {
                Ok(report) => {
                    reports.push(report);
                    progress.increment(1);
                }
                Err(e) => {
                    progress.finish_with_error(&format!("failed on {}", descriptor));
                    return Err(e);
                }
            }
        }

        progress.finish_with_message(&format!("installed {} package(s)", reports.len()));
        Ok(reports)
    }

    /// Install a single package
    pub fn install(&self, descriptor: &PackageDescriptor) -> Result<BuildReport> {
        let started = Utc::now();
        let clock = Instant::now();
        let prefix = self.prefix_for(descriptor);

        if self.modules.is_available(&descriptor.name, &descriptor.version) {
            info!("{} already available as a module, skipping", descriptor);
            return Ok(BuildReport {
                name: descriptor.name.clone(),
                version: descriptor.version.clone(),
                skipped: true,
                steps: Vec::new(),
                prefix,
                started,
                duration: clock.elapsed(),
            });
        }

        let kind = PackageKind::for_recipe(&descriptor.recipe)?;
        let steps = kind.install_steps(&descriptor.recipe, &prefix, self.config.jobs);
        let phases: Vec<String> = steps.iter().map(|s| s.phase.clone()).collect();

        if self.config.dry_run {
            for step in &steps {
                info!("[dry-run] {} {}: {}", descriptor, step.phase, step.command);
            }
            return Ok(BuildReport {
                name: descriptor.name.clone(),
                version: descriptor.version.clone(),
                skipped: false,
                steps: phases,
                prefix,
                started,
                duration: clock.elapsed(),
            });
        }

        // Everything runs through the shell; fail early when there is none
        which::which("sh")
            .map_err(|e| Error::IoError(format!("no sh on PATH to run build steps: {}", e)))?;

        info!("installing {} ({} kind) into {}", descriptor, kind, prefix.display());
        std::fs::create_dir_all(&prefix).map_err(|e| {
            Error::IoError(format!("failed to create prefix {}: {}", prefix.display(), e))
        })?;

        let workdir = TempDir::with_prefix("mason-build-")
            .map_err(|e| Error::IoError(format!("failed to create work directory: {}", e)))?;
        let env = self.step_environment(descriptor, &prefix);

        for step in &steps {
            self.run_step(descriptor, step, workdir.path(), &env)?;
        }

        self.sanity_check(descriptor, &kind, &prefix)?;

        self.modules
            .register(&descriptor.name, &descriptor.version)?;
        info!("{} installed in {:.1}s", descriptor, clock.elapsed().as_secs_f64());

        if self.config.keep_workdir {
            let kept = workdir.keep();
            debug!("keeping work directory {}", kept.display());
        }

        Ok(BuildReport {
            name: descriptor.name.clone(),
            version: descriptor.version.clone(),
            skipped: false,
            steps: phases,
            prefix,
            started,
            duration: clock.elapsed(),
        })
    }

    /// Environment for every step of one package's build
    fn step_environment(
        &self,
        descriptor: &PackageDescriptor,
        prefix: &Path,
    ) -> Vec<(String, String)> {
        let mut env = vec![
            ("MASON_PREFIX".to_string(), prefix.display().to_string()),
            ("MASON_NAME".to_string(), descriptor.name.clone()),
            ("MASON_VERSION".to_string(), descriptor.version.clone()),
            ("MAKEFLAGS".to_string(), format!("-j{}", self.config.jobs)),
        ];

        // recipe environment last so it can override, sorted for
        // reproducible step logs
        let mut extra: Vec<_> = descriptor.recipe.build.environment.iter().collect();
        extra.sort();
        for (key, value) in extra {
            env.push((key.clone(), value.clone()));
        }
        env
    }

    /// Run one build step through `sh -c` with the configured timeout
    fn run_step(
        &self,
        descriptor: &PackageDescriptor,
        step: &BuildStep,
        workdir: &Path,
        env: &[(String, String)],
    ) -> Result<()> {
        info!("running {} step for {}", step.phase, descriptor);
        debug!("command: {}", step.command);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&step.command)
            .current_dir(workdir)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::IoError(format!(
                    "failed to spawn {} step for {}: {}",
                    step.phase, descriptor, e
                ))
            })?;

        let Some(status) = child.wait_timeout(self.config.timeout)? else {
            child.kill().ok();
            child.wait().ok();
            return Err(Error::StepTimeout {
                package: descriptor.to_string(),
                phase: step.phase.clone(),
                seconds: self.config.timeout.as_secs(),
            });
        };

        let output = child.wait_with_output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        for line in stdout.lines() {
            info!("[{}] {}", step.phase, line);
        }
        for line in stderr.lines() {
            warn!("[{}] {}", step.phase, line);
        }

        if status.success() {
            Ok(())
        } else {
            Err(Error::StepFailed {
                package: descriptor.to_string(),
                phase: step.phase.clone(),
                code: status.code().unwrap_or(-1),
                stderr: stderr.trim().to_string(),
            })
        }
    }

    /// Verify the install produced what the family expects
    fn sanity_check(
        &self,
        descriptor: &PackageDescriptor,
        kind: &PackageKind,
        prefix: &Path,
    ) -> Result<()> {
        let check = kind.sanity_check(&descriptor.recipe);

        for file in &check.files {
            let path = prefix.join(file);
            if !path.is_file() {
                return Err(Error::SanityCheckFailed {
                    package: descriptor.to_string(),
                    path: path.display().to_string(),
                });
            }
        }
        for dir in &check.dirs {
            let path = prefix.join(dir);
            if !path.is_dir() {
                return Err(Error::SanityCheckFailed {
                    package: descriptor.to_string(),
                    path: path.display().to_string(),
                });
            }
        }

        debug!(
            "sanity check passed for {} ({} files, {} dirs)",
            descriptor,
            check.files.len(),
            check.dirs.len()
        );
        Ok(())
    }
}
