// src/recipe/format.rs

//! Recipe file format definitions

use crate::resolver::DependencyRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete build recipe for one package at one version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Package identity
    pub package: PackageSection,

    /// Packages that must be available before this one builds
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,

    /// Build instructions (generic configure/make/install sequence)
    #[serde(default)]
    pub build: BuildSection,

    /// Files and directories a finished install must contain
    #[serde(default)]
    pub sanity: Option<SanitySection>,

    /// Variables for substitution (optional)
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl Recipe {
    /// The version string including the toolchain suffix, if any
    ///
    /// This is the identity the resolver and the module oracle key on:
    /// `gzip` at version `1.4` with toolchain `GCC-4.6.3` is module
    /// `gzip/1.4-GCC-4.6.3`.
    pub fn full_version(&self) -> String {
        match &self.package.toolchain {
            Some(suffix) => format!("{}-{}", self.package.version, suffix),
            None => self.package.version.clone(),
        }
    }

    /// (name, full version) identity pair
    pub fn identity(&self) -> (String, String) {
        (self.package.name.clone(), self.full_version())
    }

    /// Substitute variables in a command template
    ///
    /// Replaces `%(name)s` patterns with their values from:
    /// 1. Built-in variables (name, version, prefix, jobs)
    /// 2. Custom variables from the [variables] section
    pub fn substitute(&self, template: &str, prefix: &str, jobs: u32) -> String {
        let mut result = template.to_string();

        result = result.replace("%(name)s", &self.package.name);
        result = result.replace("%(version)s", &self.package.version);
        result = result.replace("%(prefix)s", prefix);
        result = result.replace("%(jobs)s", &jobs.to_string());

        for (key, value) in &self.variables {
            result = result.replace(&format!("%({})s", key), value);
        }

        result
    }
}

/// Package identity section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// Package version (without toolchain suffix)
    pub version: String,

    /// Toolchain suffix appended to the version for identity and file
    /// naming (e.g. "GCC-4.6.3")
    #[serde(default)]
    pub toolchain: Option<String>,

    /// Package family tag selecting the install behavior
    /// ("intel-mkl", "intel-mpi", "wxpython"; absent means generic)
    #[serde(default)]
    pub block: Option<String>,

    /// Short description
    #[serde(default)]
    pub summary: Option<String>,

    /// Upstream homepage
    #[serde(default)]
    pub homepage: Option<String>,
}

/// Build instructions for the generic configure/make/install family
///
/// Family-specific blocks (Intel installers, wxPython) ignore most of this
/// section and derive their commands from the package version instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildSection {
    /// Command run before configuring (optional)
    #[serde(default)]
    pub setup: Option<String>,

    /// Configure command
    #[serde(default)]
    pub configure: Option<String>,

    /// Build command
    #[serde(default)]
    pub make: Option<String>,

    /// Install command
    #[serde(default)]
    pub install: Option<String>,

    /// Extra environment variables for all build steps
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Parallel job override for this recipe
    #[serde(default)]
    pub jobs: Option<u32>,
}

/// Post-install sanity expectations, relative to the install prefix
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SanitySection {
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub dirs: Vec<String>,
}
