//! # kubeload-schema: Type Catalogs
//!
//! The type registry is external data: a catalog of object types, each
//! described by two tables keyed by internal field identifier:
//!
//! - `attribute_map`: field → document key (`api_version: apiVersion`)
//! - `openapi_types`: field → type signature (`api_version: str`)
//!
//! This crate reads such catalogs from YAML or JSON text, single files, or
//! directories of files, checks that both tables name the same fields, and
//! freezes the result into a [`kubeload_core::TypeRegistry`]. A core
//! catalog of common Kubernetes objects is bundled and available through
//! [`builtin_registry`].
//!
//! ## Catalog Format
//!
//! ```yaml
//! types:
//!   V1ObjectMeta:
//!     attribute_map:
//!       name: name
//!       labels: labels
//!     openapi_types:
//!       name: str
//!       labels: dict(str, str)
//! ```
//!
//! `swagger_types` is accepted as an alias of `openapi_types`. Field order
//! in `attribute_map` becomes the descriptor's field order.

pub mod catalog;
pub mod error;

pub use catalog::{builtin_registry, load_registry, parse_catalog, Catalog, BUILTIN_CATALOG};
pub use error::CatalogError;
