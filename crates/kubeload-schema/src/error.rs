//! # Catalog Errors

use kubeload_core::SchemaError;
use thiserror::Error;

/// Error reading a type catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A catalog file or directory could not be read.
    #[error("cannot read catalog '{path}': {source}")]
    Io {
        /// File or directory path.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The catalog text is not valid YAML/JSON for the catalog format.
    #[error("invalid catalog '{origin}': {reason}")]
    Parse {
        /// File path or other description of where the text came from.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// A field appears in `attribute_map` but not in `openapi_types`.
    #[error("{origin}: field '{field}' of {type_name} has a document key but no type signature")]
    MissingSignature {
        /// Where the catalog came from.
        origin: String,
        /// Type declaring the field.
        type_name: String,
        /// Internal field identifier.
        field: String,
    },

    /// A field appears in `openapi_types` but not in `attribute_map`.
    #[error("{origin}: field '{field}' of {type_name} has a type signature but no document key")]
    MissingKey {
        /// Where the catalog came from.
        origin: String,
        /// Type declaring the field.
        type_name: String,
        /// Internal field identifier.
        field: String,
    },

    /// A descriptor or the registry rejected an entry.
    #[error("{origin}: {source}")]
    Schema {
        /// Where the catalog came from.
        origin: String,
        /// Rejection reason.
        source: SchemaError,
    },
}
