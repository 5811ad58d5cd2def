// src/blocks/mod.rs

//! Package families and their install behavior
//!
//! The broader orchestrator historically dispatched to a class per package
//! family; here each family is one arm of [`PackageKind`], a plain
//! data+function record. A kind knows three things about a package:
//!
//! - the shell steps that install it (`install_steps`)
//! - the files and directories a finished install must contain
//!   (`sanity_check`)
//! - the environment a module for it should provide (`module_env` /
//!   `env_exports`)
//!
//! All three are gated on the package version where vendor layouts changed
//! across releases (the Intel 10.x → 11.x → oneAPI 2021 reshuffles, the
//! wxPython 3 → 4 build system switch).

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::version::LooseVersion;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// One shell command in an install sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    /// Phase label for logs and error reports ("configure", "install", ...)
    pub phase: String,
    /// Command executed via `sh -c`
    pub command: String,
}

impl BuildStep {
    fn new(phase: &str, command: impl Into<String>) -> Self {
        Self {
            phase: phase.to_string(),
            command: command.into(),
        }
    }
}

/// Files and directories expected under the install prefix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanityCheck {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// The supported package families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum PackageKind {
    /// Plain configure/make/install from the recipe's [build] section
    #[default]
    Generic,
    /// Intel Math Kernel Library (silent vendor installer)
    IntelMkl,
    /// Intel MPI library (silent vendor installer)
    IntelMpi,
    /// wxPython (builder script, pip-style for 4.x)
    #[strum(serialize = "wxpython")]
    WxPython,
}

impl PackageKind {
    /// Select the kind from a recipe's `block` tag
    pub fn for_recipe(recipe: &Recipe) -> Result<Self> {
        match &recipe.package.block {
            None => Ok(Self::Generic),
            Some(tag) => Self::from_str(tag).map_err(|_| {
                Error::ValidationError(format!(
                    "{}-{} names unknown block \"{}\"",
                    recipe.package.name,
                    recipe.full_version(),
                    tag
                ))
            }),
        }
    }

    /// The shell steps that install this package into `prefix`
    pub fn install_steps(&self, recipe: &Recipe, prefix: &Path, jobs: u32) -> Vec<BuildStep> {
        let jobs = recipe.build.jobs.unwrap_or(jobs);
        let prefix_str = prefix.display().to_string();
        let v = LooseVersion::parse(&recipe.package.version);

        match self {
            Self::Generic => generic_steps(recipe, &prefix_str, jobs),
            Self::IntelMkl | Self::IntelMpi => intel_steps(v, &prefix_str),
            Self::WxPython => {
                if v.at_least("4") {
                    vec![BuildStep::new(
                        "install",
                        recipe.substitute(
                            "python -m pip install --prefix=%(prefix)s wxPython-%(version)s.tar.gz",
                            &prefix_str,
                            jobs,
                        ),
                    )]
                } else {
                    // one script configures, builds and installs
                    vec![BuildStep::new(
                        "install",
                        recipe.substitute(
                            "python wxPython/build-wxpython.py --prefix=%(prefix)s \
                             --wxpy_installdir=%(prefix)s --install",
                            &prefix_str,
                            jobs,
                        ),
                    )]
                }
            }
        }
    }

    /// Expected post-install paths: the family's defaults plus whatever the
    /// recipe's [sanity] section adds
    pub fn sanity_check(&self, recipe: &Recipe) -> SanityCheck {
        let v = LooseVersion::parse(&recipe.package.version);
        let mut check = match self {
            Self::Generic => SanityCheck::default(),
            Self::IntelMkl => mkl_sanity(&v, &recipe.package.version),
            Self::IntelMpi => impi_sanity(&v),
            Self::WxPython => {
                let majver = major_minor(&recipe.package.version);
                SanityCheck {
                    files: vec![
                        "bin/wxrc".to_string(),
                        format!("lib/libwx_baseu-{}.so", majver),
                        format!("lib/libwx_gtk2u_core-{}.so", majver),
                    ],
                    dirs: vec![
                        "include".to_string(),
                        "share".to_string(),
                        "lib/python".to_string(),
                    ],
                }
            }
        };

        if let Some(sanity) = &recipe.sanity {
            check.files.extend(sanity.files.iter().cloned());
            check.dirs.extend(sanity.dirs.iter().cloned());
        }
        check
    }

    /// Module environment guesses: variable name → prefix-relative
    /// directories to prepend
    pub fn module_env(&self, recipe: &Recipe) -> Vec<(String, Vec<String>)> {
        let v = LooseVersion::parse(&recipe.package.version);
        match self {
            Self::Generic => vec![
                ("PATH".to_string(), vec!["bin".to_string()]),
                ("LD_LIBRARY_PATH".to_string(), vec!["lib".to_string(), "lib64".to_string()]),
                ("LIBRARY_PATH".to_string(), vec!["lib".to_string(), "lib64".to_string()]),
                ("CPATH".to_string(), vec!["include".to_string()]),
                ("MANPATH".to_string(), vec!["share/man".to_string()]),
            ],
            Self::IntelMkl => mkl_module_env(&v, &recipe.package.version),
            Self::IntelMpi => impi_module_env(&v),
            Self::WxPython => {
                let majver = major_minor(&recipe.package.version);
                vec![
                    ("PATH".to_string(), vec!["bin".to_string()]),
                    ("LD_LIBRARY_PATH".to_string(), vec!["lib".to_string()]),
                    (
                        "PYTHONPATH".to_string(),
                        vec![format!("lib/python/wx-{}-gtk2", majver)],
                    ),
                ]
            }
        }
    }

    /// Extra environment variables a module should export, as
    /// prefix-relative paths (empty string means the prefix itself)
    pub fn env_exports(&self, recipe: &Recipe) -> Vec<(String, String)> {
        let v = LooseVersion::parse(&recipe.package.version);
        match self {
            Self::Generic | Self::WxPython => Vec::new(),
            Self::IntelMkl => {
                let mklroot = if v.at_least("2021") {
                    format!("mkl/{}", recipe.package.version)
                } else {
                    "mkl".to_string()
                };
                vec![("MKLROOT".to_string(), mklroot)]
            }
            Self::IntelMpi => vec![("I_MPI_ROOT".to_string(), String::new())],
        }
    }
}

fn generic_steps(recipe: &Recipe, prefix: &str, jobs: u32) -> Vec<BuildStep> {
    let build = &recipe.build;
    let mut steps = Vec::new();

    if let Some(setup) = &build.setup {
        steps.push(BuildStep::new("setup", recipe.substitute(setup, prefix, jobs)));
    }
    if let Some(configure) = &build.configure {
        steps.push(BuildStep::new("configure", recipe.substitute(configure, prefix, jobs)));
    }
    if let Some(make) = &build.make {
        steps.push(BuildStep::new("make", recipe.substitute(make, prefix, jobs)));
    }
    if let Some(install) = &build.install {
        steps.push(BuildStep::new("install", recipe.substitute(install, prefix, jobs)));
    }

    // A recipe with an empty [build] section means "the usual"
    if steps.is_empty() {
        steps.push(BuildStep::new("configure", format!("./configure --prefix={}", prefix)));
        steps.push(BuildStep::new("make", format!("make -j{}", jobs)));
        steps.push(BuildStep::new("install", "make install".to_string()));
    }

    steps
}

/// Silent-installer invocation shared by the Intel families
///
/// The invocation changed three times across releases: oneAPI (2021+)
/// takes everything on the command line, 11.1+ takes a standard silent
/// config, and the 2012-era installers used different key names in it.
fn intel_steps(v: LooseVersion, prefix: &str) -> Vec<BuildStep> {
    if v.at_least("2021") {
        vec![BuildStep::new(
            "install",
            format!("sh ./install.sh -a --silent --eula accept --install-dir={}", prefix),
        )]
    } else if v.at_least("11.1") {
        vec![
            BuildStep::new(
                "silent-cfg",
                format!(
                    "printf 'ACCEPT_EULA=accept\\nPSET_INSTALL_DIR={}\\nACTIVATION_TYPE=exist_lic\\n' > silent.cfg",
                    prefix
                ),
            ),
            BuildStep::new("install", "sh ./install.sh --silent ./silent.cfg".to_string()),
        ]
    } else {
        vec![
            BuildStep::new(
                "silent-cfg",
                format!(
                    "printf 'ACCEPT_EULA=accept\\nPSET_INSTALL_DIR={}\\nACTIVATION=exist_lic\\n' > silent.cfg",
                    prefix
                ),
            ),
            BuildStep::new("install", "sh ./install.sh --silent ./silent.cfg".to_string()),
        ]
    }
}

fn mkl_sanity(v: &LooseVersion, version: &str) -> SanityCheck {
    if v.at_least("2021") {
        let base = format!("mkl/{}", version);
        SanityCheck {
            files: vec![
                format!("{}/include/mkl.h", base),
                format!("{}/lib/intel64/libmkl_core.so", base),
            ],
            dirs: vec![
                format!("{}/bin", base),
                format!("{}/lib/intel64", base),
                format!("{}/include", base),
            ],
        }
    } else if v.at_least("10.3") {
        SanityCheck {
            files: vec![
                "mkl/include/mkl.h".to_string(),
                "mkl/lib/intel64/libmkl_core.so".to_string(),
            ],
            dirs: vec![
                "bin".to_string(),
                "mkl/bin".to_string(),
                "mkl/lib/intel64".to_string(),
                "mkl/include".to_string(),
            ],
        }
    } else {
        SanityCheck {
            files: vec!["include/mkl.h".to_string(), "lib/em64t/libmkl.so".to_string()],
            dirs: vec![
                "lib/em64t".to_string(),
                "include".to_string(),
                "interfaces".to_string(),
            ],
        }
    }
}

fn mkl_module_env(v: &LooseVersion, version: &str) -> Vec<(String, Vec<String>)> {
    if v.at_least("2021") {
        let lib_dirs = vec![
            format!("compiler/{}/linux/compiler/lib/intel64_lin", version),
            format!("mkl/{}/lib/intel64", version),
        ];
        vec![
            ("LD_LIBRARY_PATH".to_string(), lib_dirs.clone()),
            ("LIBRARY_PATH".to_string(), lib_dirs),
            ("CPATH".to_string(), vec![format!("mkl/{}/include", version)]),
            (
                "PKG_CONFIG_PATH".to_string(),
                vec![format!("mkl/{}/tools/pkgconfig", version)],
            ),
        ]
    } else if v.at_least("10.3") {
        let lib_dirs = vec!["lib/intel64".to_string(), "mkl/lib/intel64".to_string()];
        vec![
            ("LD_LIBRARY_PATH".to_string(), lib_dirs.clone()),
            ("LIBRARY_PATH".to_string(), lib_dirs),
            (
                "CPATH".to_string(),
                vec!["mkl/include".to_string(), "mkl/include/fftw".to_string()],
            ),
            ("PKG_CONFIG_PATH".to_string(), vec!["mkl/bin/pkgconfig".to_string()]),
            ("MANPATH".to_string(), vec!["man".to_string(), "man/en_US".to_string()]),
        ]
    } else {
        let lib_dirs = vec!["lib".to_string(), "lib/em64t".to_string()];
        vec![
            (
                "PATH".to_string(),
                vec!["bin".to_string(), "bin/intel64".to_string(), "tbb/bin/em64t".to_string()],
            ),
            ("LD_LIBRARY_PATH".to_string(), lib_dirs.clone()),
            ("LIBRARY_PATH".to_string(), lib_dirs),
            (
                "MANPATH".to_string(),
                vec!["man".to_string(), "share/man".to_string(), "man/en_US".to_string()],
            ),
        ]
    }
}

fn impi_sanity(v: &LooseVersion) -> SanityCheck {
    if v.at_least("2019") {
        SanityCheck {
            files: vec![
                "intel64/bin/mpiicc".to_string(),
                "intel64/bin/mpirun".to_string(),
                "intel64/include/mpi.h".to_string(),
                "intel64/lib/release/libmpi.so".to_string(),
            ],
            dirs: vec!["intel64/include".to_string()],
        }
    } else if v.at_least("4.1") {
        SanityCheck {
            files: vec![
                "bin64/mpiicc".to_string(),
                "include64/mpi.h".to_string(),
                "lib64/libmpi.so".to_string(),
            ],
            dirs: vec!["include64".to_string()],
        }
    } else {
        SanityCheck {
            files: vec!["bin/mpiicc".to_string(), "include/mpi.h".to_string()],
            dirs: vec!["lib".to_string()],
        }
    }
}

fn impi_module_env(v: &LooseVersion) -> Vec<(String, Vec<String>)> {
    if v.at_least("2019") {
        // release_mt and release stay in front of the plain lib symlinks;
        // 2019 changed the default library to the non-mt variant
        let lib_dirs = vec![
            "intel64/lib/release_mt".to_string(),
            "intel64/lib/release".to_string(),
            "intel64/lib".to_string(),
        ];
        vec![
            ("PATH".to_string(), vec!["intel64/bin".to_string()]),
            ("LD_LIBRARY_PATH".to_string(), lib_dirs.clone()),
            ("LIBRARY_PATH".to_string(), lib_dirs),
            ("CPATH".to_string(), vec!["intel64/include".to_string()]),
            ("MANPATH".to_string(), vec!["man".to_string()]),
        ]
    } else {
        let lib_dirs = vec!["lib/em64t".to_string(), "lib64".to_string()];
        vec![
            (
                "PATH".to_string(),
                vec!["bin/intel64".to_string(), "bin64".to_string()],
            ),
            ("LD_LIBRARY_PATH".to_string(), lib_dirs.clone()),
            ("LIBRARY_PATH".to_string(), lib_dirs),
            ("CPATH".to_string(), vec!["include64".to_string()]),
            ("MANPATH".to_string(), vec!["man".to_string()]),
        ]
    }
}

/// "2.8.12" → "2.8"
fn major_minor(version: &str) -> String {
    version.split('.').take(2).collect::<Vec<_>>().join(".")
}
