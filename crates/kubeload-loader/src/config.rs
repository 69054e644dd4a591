//! # Loader Configuration
//!
//! Read from YAML (every key optional):
//!
//! ```yaml
//! extensions: [yaml, yml]
//! max_depth: 64
//! skip_unresolved: false
//! sorted: true
//! ```

use std::path::Path;

use kubeload_core::{BuildOptions, DEFAULT_MAX_DEPTH};
use serde::Deserialize;

use crate::error::LoadError;

/// Tunables for [`crate::ManifestLoader`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// File extensions loaded from directories, without the dot. Compared
    /// case-insensitively.
    pub extensions: Vec<String>,
    /// Deepest nested-object level allowed.
    pub max_depth: usize,
    /// Skip documents whose type cannot be resolved instead of failing.
    pub skip_unresolved: bool,
    /// Process directory entries in file-name order.
    pub sorted: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string(), "yml".to_string()],
            max_depth: DEFAULT_MAX_DEPTH,
            skip_unresolved: false,
            sorted: true,
        }
    }
}

impl LoaderConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str, origin: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(text).map_err(|e| LoadError::Config {
            origin: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| LoadError::Config {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&text, &origin)
    }

    /// Whether a directory entry should be loaded, judged by its extension.
    pub fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Core build options derived from this configuration.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            max_depth: self.max_depth,
        }
    }
}
