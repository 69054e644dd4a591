//! # Template Rendering Hook
//!
//! Only the calling contract lives here; the templating language is up to
//! the caller. A renderer receives the raw text of one source and a
//! [`RenderContext`], and returns text that must be valid YAML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kubeload_core::Object;
use serde_yaml::Value;
use thiserror::Error;

/// A renderer failure, with a caller-supplied message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template rendering failed: {message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// A failure with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message passed to [`RenderError::new`].
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Values available to a template while it is rendered.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    vars: BTreeMap<String, Value>,
    path: Option<PathBuf>,
    type_name: Option<String>,
    objects: Vec<Object>,
}

impl RenderContext {
    /// A context with the given caller variables.
    pub fn new(vars: BTreeMap<String, Value>) -> Self {
        Self {
            vars,
            ..Self::default()
        }
    }

    /// Caller variables.
    pub fn vars(&self) -> &BTreeMap<String, Value> {
        &self.vars
    }

    /// One caller variable.
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// The file being rendered, when it came from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The requested type, for typed loads.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Objects constructed earlier in the current batch, in load order.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub(crate) fn set_path(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
    }

    pub(crate) fn set_type_name(&mut self, type_name: &str) {
        self.type_name = Some(type_name.to_string());
    }

    pub(crate) fn extend_objects(&mut self, objects: Vec<Object>) {
        self.objects.extend(objects);
    }

    pub(crate) fn into_objects(self) -> Vec<Object> {
        self.objects
    }
}

/// Turns a manifest template into YAML text.
pub trait Renderer {
    /// Render `template` with access to `context`.
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&str, &RenderContext) -> Result<String, RenderError>,
{
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
        self(template, context)
    }
}

/// Returns the template unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {
    fn render(&self, template: &str, _context: &RenderContext) -> Result<String, RenderError> {
        Ok(template.to_string())
    }
}
