//! # kubeload-cli: Command-Line Interface
//!
//! Thin clap front end over the library crates.
//!
//! ## Subcommands
//!
//! - `load`: build objects from a manifest file or directory
//! - `resolve`: show how an `apiVersion`/`kind` pair maps to a type
//! - `types`: list the types in the active catalog
//!
//! ## Crate Policy
//!
//! - Argument structs live next to their handlers; `main.rs` only parses
//!   and dispatches.
//! - Handlers write to a caller-supplied `Write` so they can be tested
//!   without capturing stdout.
//! - Errors are reported through `anyhow` with the failing path attached.

use std::path::{Path, PathBuf};

use anyhow::Context;
use kubeload_core::TypeRegistry;
use kubeload_loader::LoaderConfig;

pub mod load;
pub mod resolve;
pub mod types;

/// The registry from `--catalog` sources, or the bundled catalog when none
/// are given.
pub fn open_registry(catalogs: &[PathBuf]) -> anyhow::Result<TypeRegistry> {
    let registry = if catalogs.is_empty() {
        kubeload_schema::builtin_registry().context("bundled catalog is invalid")?
    } else {
        kubeload_schema::load_registry(catalogs).context("cannot load type catalog")?
    };
    tracing::debug!(types = registry.len(), "type registry ready");
    Ok(registry)
}

/// The loader configuration from `--config`, or defaults.
pub fn read_config(path: Option<&Path>) -> anyhow::Result<LoaderConfig> {
    match path {
        Some(path) => Ok(LoaderConfig::from_file(path)?),
        None => Ok(LoaderConfig::default()),
    }
}
