//! # kubeload-loader: Manifest Loading
//!
//! The I/O side of kubeload. Reads manifest text from strings, files, or
//! directories, optionally renders it as a template, splits it into YAML
//! documents, and hands each document to the core builder.
//!
//! ## Template Rendering
//!
//! A [`Renderer`] is called once per source before YAML parsing. Its
//! [`RenderContext`] carries caller variables, the source path, the target
//! type for typed loads, and every object constructed earlier in the same
//! batch, so a later manifest can refer to values from an earlier one.
//! Without a renderer the text is parsed as is.
//!
//! ## Crate Policy
//!
//! - YAML is parsed with `serde_yaml` into plain values; tags never select
//!   a Rust type.
//! - Failures carry the source path and document index.
//! - Directory loads are ordered by file name unless configured otherwise.

pub mod config;
pub mod error;
pub mod loader;
pub mod render;

pub use config::LoaderConfig;
pub use error::LoadError;
pub use loader::ManifestLoader;
pub use render::{PassthroughRenderer, RenderContext, RenderError, Renderer};
