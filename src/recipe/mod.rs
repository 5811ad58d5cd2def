// src/recipe/mod.rs

//! Recipe system: build specifications for scientific software
//!
//! Recipes are TOML files that describe one package at one version: its
//! identity (with an optional toolchain suffix), the packages it depends on,
//! its build commands, and the files a finished install must contain.
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "gzip"
//! version = "1.4"
//! toolchain = "GCC-4.6.3"
//!
//! [[dependencies]]
//! name = "GCC"
//! version = "4.6.3"
//!
//! [build]
//! configure = "./configure --prefix=%(prefix)s"
//! make = "make -j%(jobs)s"
//! install = "make install"
//!
//! [sanity]
//! files = ["bin/gzip"]
//! ```
//!
//! Recipe files are looked up on the robot search path (the directory
//! tree of known recipes) by their `{name}-{version}[-{suffix}].toml`
//! file name; see [`SearchPath`].

mod format;
mod locator;
pub mod parser;

pub use format::{BuildSection, PackageSection, Recipe, SanitySection};
pub use locator::{RecipeLocator, SearchPath};
pub use parser::{parse_recipe, parse_recipe_file, validate_recipe};
