//! # Loader Errors
//!
//! Every variant names the source (file path, or `<string>` for in-memory
//! text). Core errors are wrapped unchanged so callers can still match on
//! the malformed / unresolved / cast distinction.

use kubeload_core::{CastError, DecodeError};
use thiserror::Error;

use crate::render::RenderError;

/// Error loading manifests.
#[derive(Error, Debug)]
pub enum LoadError {
    /// A file or directory could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// File or directory path.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A directory load was given something that is not a directory.
    #[error("{path} is not a directory")]
    NotADirectory {
        /// The offending path.
        path: String,
    },

    /// The (rendered) text is not valid YAML.
    #[error("invalid YAML in {origin}: {source}")]
    Yaml {
        /// Source of the text.
        origin: String,
        /// Parser failure.
        source: serde_yaml::Error,
    },

    /// The template renderer failed.
    #[error("{origin}: {source}")]
    Render {
        /// Source of the template.
        origin: String,
        /// Renderer failure.
        source: RenderError,
    },

    /// A document could not be resolved or built.
    #[error("{origin}, document {index}: {source}")]
    Decode {
        /// Source of the document.
        origin: String,
        /// Zero-based position among the non-empty documents of the source.
        index: usize,
        /// Core failure.
        source: DecodeError,
    },

    /// A typed load could not build the requested type.
    #[error("{origin}: cannot load as {type_name}: {source}")]
    Cast {
        /// Source of the document.
        origin: String,
        /// Requested type.
        type_name: String,
        /// Core failure.
        source: CastError,
    },

    /// A typed load found zero or several documents.
    #[error("{origin}: expected exactly one document, found {found}")]
    DocumentCount {
        /// Source of the text.
        origin: String,
        /// Number of non-empty documents found.
        found: usize,
    },

    /// A loader configuration file is unreadable or invalid.
    #[error("invalid loader configuration '{origin}': {reason}")]
    Config {
        /// Configuration source.
        origin: String,
        /// What is wrong.
        reason: String,
    },
}

impl LoadError {
    /// The core decode failure, if this error wraps one.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}
