//! # kubeload-core: Schema-Driven Manifest Construction
//!
//! Turns loosely-typed YAML documents into typed object graphs. The target
//! type of a document is not known statically: it is resolved at runtime
//! from the document's `apiVersion`/`kind`, and the field layout of every
//! type comes from a [`TypeDescriptor`] held in a [`TypeRegistry`] rather
//! than from hand-written parsing code.
//!
//! ## Pipeline
//!
//! ```text
//! serde_yaml::Value ──▶ resolve ──▶ TypeDescriptor
//!                                        │
//!                                        ▼
//!                     Builder::build ──▶ Builder::cast ──▶ Object
//!                           ▲                  │
//!                           └── nested types ──┘
//! ```
//!
//! - [`resolve`]: picks a descriptor from the registry using candidate
//!   names derived from `apiVersion` and `kind`.
//! - [`Builder::build`]: walks a descriptor's fields, looks up each
//!   external key in the raw mapping, and casts present values.
//! - [`Builder::cast`]: dispatches on the parsed [`TypeSignature`]:
//!   collection, mapping, primitive, or nested object.
//!
//! ## Crate Policy
//!
//! - Pure functions over the input value and a read-only registry. No I/O,
//!   no logging, no global state.
//! - Any failure aborts the whole top-level construction; no partially
//!   built object is ever returned.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod build;
pub mod cast;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod resolve;
pub mod signature;
pub mod value;

pub use build::{BuildOptions, Builder, DEFAULT_MAX_DEPTH};
pub use descriptor::{FieldSpec, TypeDescriptor};
pub use error::{
    CastError, CastErrorKind, DecodeError, FieldPath, PathSegment, ResolveError, SchemaError,
};
pub use registry::{DanglingReference, RegistryBuilder, TypeRegistry};
pub use resolve::{candidate_names, resolve, resolve_meta, TypeMeta};
pub use signature::{Primitive, SignatureError, TypeSignature};
pub use value::{CastMap, CastValue, Object};
