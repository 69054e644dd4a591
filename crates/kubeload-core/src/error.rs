//! # Error Types: Structured Error Hierarchy
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations, except [`CastError`] whose message is prefixed with the
//! field path where the cast failed.
//!
//! ## Taxonomy
//!
//! - [`SchemaError`]: a descriptor or registry could not be assembled.
//! - [`ResolveError`]: the document is structurally invalid (no
//!   `apiVersion`/`kind`). Distinct from "type not found".
//! - [`CastError`]: a value does not fit its declared signature, or a
//!   nested type name is unknown. Aborts the whole top-level build.
//! - [`DecodeError`]: resolve + build in one step, adding
//!   [`DecodeError::UnresolvedType`].

use std::fmt;

use thiserror::Error;

use crate::signature::{Primitive, SignatureError};

/// Error assembling a type descriptor or registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field's type signature is not one of the recognized shapes.
    #[error("field '{field}' of {type_name}: {source}")]
    InvalidSignature {
        /// Type that declares the field.
        type_name: String,
        /// Internal field identifier.
        field: String,
        /// Parse failure.
        source: SignatureError,
    },

    /// Two fields of one type share an internal identifier.
    #[error("duplicate field '{field}' in {type_name}")]
    DuplicateField {
        /// Type that declares the field.
        type_name: String,
        /// Repeated internal field identifier.
        field: String,
    },

    /// Two fields of one type map to the same document key.
    #[error("fields of {type_name} share the document key '{key}'")]
    DuplicateKey {
        /// Type that declares the fields.
        type_name: String,
        /// Repeated external key.
        key: String,
    },

    /// A type name is already registered (compared case-insensitively).
    #[error("type '{name}' collides with already registered '{existing}'")]
    DuplicateType {
        /// Name being registered.
        name: String,
        /// Name already in the registry.
        existing: String,
    },
}

/// The document cannot be resolved because it is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The top-level document is not a mapping.
    #[error("manifest is not a mapping (found {0})")]
    NotAMapping(&'static str),

    /// A required string field is absent, null, or not a string.
    #[error("manifest has no \"{0}\" field specified")]
    MissingField(&'static str),

    /// The document, or its `apiVersion`/`kind`, carries an explicit YAML tag.
    #[error("manifest carries explicit YAML tag '{0}'")]
    UnexpectedTag(String),
}

/// One step in the path from the document root to a failing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// An object field, named by its document key.
    Field(String),
    /// A position in a sequence.
    Index(usize),
    /// An entry of a mapping-typed field, named by its raw key.
    Key(String),
}

/// Location of a value inside a document, outermost segment first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty (document root) path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments from outermost to innermost.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether this is the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn push_front(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[{key}]")?,
            }
        }
        Ok(())
    }
}

/// Why a value could not be cast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CastErrorKind {
    /// The signature string matches none of the recognized shapes.
    #[error(transparent)]
    InvalidSignature(#[from] SignatureError),

    /// A bare type name is neither a primitive nor a registered type.
    #[error("unable to determine cast type behavior: {0}")]
    UnknownType(String),

    /// The value has the wrong shape for the signature.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Signature or type name that was expected.
        expected: String,
        /// Kind of YAML value that was found.
        found: &'static str,
    },

    /// The value has the right shape but its content does not convert.
    #[error("cannot convert '{value}' to {primitive}: {reason}")]
    InvalidPrimitive {
        /// Target primitive.
        primitive: Primitive,
        /// Offending value, rendered as text.
        value: String,
        /// Conversion failure.
        reason: String,
    },

    /// A YAML tag was found on a value that is not an untyped `object`.
    #[error("explicit YAML tag '{0}' is not supported")]
    UnexpectedTag(String),

    /// Nesting exceeded the configured maximum depth.
    #[error("nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
}

/// A cast failure together with the field path where it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct CastError {
    path: FieldPath,
    kind: CastErrorKind,
}

impl CastError {
    /// A failure at the current value; outer levels prepend their segments.
    pub fn new(kind: CastErrorKind) -> Self {
        Self {
            path: FieldPath::root(),
            kind,
        }
    }

    /// The failure reason.
    pub fn kind(&self) -> &CastErrorKind {
        &self.kind
    }

    /// Where in the document the failure happened.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Record that the failing value sits under `segment`.
    pub(crate) fn within(mut self, segment: PathSegment) -> Self {
        self.path.push_front(segment);
        self
    }
}

impl From<CastErrorKind> for CastError {
    fn from(kind: CastErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for CastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Failure to resolve and build one document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The document lacks `apiVersion` or `kind`.
    #[error(transparent)]
    Malformed(#[from] ResolveError),

    /// No candidate name matched a registered type.
    #[error("unable to determine object type for apiVersion '{api_version}', kind '{kind}'")]
    UnresolvedType {
        /// Declared `apiVersion`.
        api_version: String,
        /// Declared `kind`.
        kind: String,
    },

    /// The resolved type could not be built from the document.
    #[error(transparent)]
    Cast(#[from] CastError),
}

impl DecodeError {
    /// Whether the document was well-formed but named an unknown type.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedType { .. })
    }
}
