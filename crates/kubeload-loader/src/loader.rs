//! # Manifest Loader
//!
//! Entry points, from smallest to largest unit:
//!
//! - [`ManifestLoader::load_str`]: every document in a string.
//! - [`ManifestLoader::load_file`]: every document in one file.
//! - [`ManifestLoader::load_path`]: every matching file in a directory.
//! - [`ManifestLoader::load_type`]: exactly one document, built into a
//!   caller-named type without `apiVersion`/`kind` resolution.
//!
//! Each source is rendered (if a renderer is set), split into YAML
//! documents, and each non-empty document is resolved and built. Any
//! failure aborts the call.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kubeload_core::{Builder, Object, TypeRegistry};
use serde::Deserialize;
use serde_yaml::Value;

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::render::{RenderContext, RenderError, Renderer};

const STRING_ORIGIN: &str = "<string>";

/// Loads manifests into typed objects using a fixed registry.
pub struct ManifestLoader<'r> {
    builder: Builder<'r>,
    config: LoaderConfig,
    renderer: Option<Box<dyn Renderer + 'r>>,
    vars: BTreeMap<String, Value>,
}

impl std::fmt::Debug for ManifestLoader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestLoader")
            .field("config", &self.config)
            .field("renderer", &self.renderer.is_some())
            .field("vars", &self.vars)
            .finish()
    }
}

impl<'r> ManifestLoader<'r> {
    /// A loader with the default configuration and no renderer.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_config(registry, LoaderConfig::default())
    }

    /// A loader with an explicit configuration.
    pub fn with_config(registry: &'r TypeRegistry, config: LoaderConfig) -> Self {
        Self {
            builder: Builder::with_options(registry, config.build_options()),
            config,
            renderer: None,
            vars: BTreeMap::new(),
        }
    }

    /// Render every source through `renderer` before parsing.
    pub fn with_renderer<R: Renderer + 'r>(mut self, renderer: R) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Closure form of [`with_renderer`](Self::with_renderer).
    pub fn with_renderer_fn<F>(self, render: F) -> Self
    where
        F: Fn(&str, &RenderContext) -> Result<String, RenderError> + 'r,
    {
        self.with_renderer(render)
    }

    /// Make a variable available to the renderer.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// The configuration in effect.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The registry objects are resolved against.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.builder.registry()
    }

    /// Load every document in `text`.
    pub fn load_str(&self, text: &str) -> Result<Vec<Object>, LoadError> {
        let context = self.base_context();
        self.load_source(text, &context, STRING_ORIGIN)
    }

    /// Load every document in the file at `path`.
    pub fn load_file(&self, path: &Path) -> Result<Vec<Object>, LoadError> {
        let mut context = self.base_context();
        context.set_path(path);
        let text = read_source(path)?;
        self.load_source(&text, &context, &path.display().to_string())
    }

    /// Load every file in `dir` whose extension is configured.
    ///
    /// Subdirectories are not descended into. Objects from earlier files
    /// are visible to the renderer while later files are rendered.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotADirectory`] if `dir` is not a directory; otherwise
    /// the first failure from any file.
    pub fn load_path(&self, dir: &Path) -> Result<Vec<Object>, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::NotADirectory {
                path: dir.display().to_string(),
            });
        }

        let files = self.manifest_files(dir)?;
        let mut context = self.base_context();
        for file in &files {
            context.set_path(file);
            let text = read_source(file)?;
            let objects = self.load_source(&text, &context, &file.display().to_string())?;
            context.extend_objects(objects);
        }

        let objects = context.into_objects();
        tracing::info!(
            dir = %dir.display(),
            files = files.len(),
            objects = objects.len(),
            "manifests loaded"
        );
        Ok(objects)
    }

    /// Load a file if `path` is a file, or a directory if it is one.
    pub fn load(&self, path: &Path) -> Result<Vec<Object>, LoadError> {
        if path.is_dir() {
            self.load_path(path)
        } else {
            self.load_file(path)
        }
    }

    /// Load the single document in `path` as `type_name`.
    ///
    /// `apiVersion`/`kind` are not consulted, so the document need not
    /// carry them.
    ///
    /// # Errors
    ///
    /// [`LoadError::DocumentCount`] unless the file holds exactly one
    /// non-empty document; [`LoadError::Cast`] if the type is unknown or
    /// the document does not fit it.
    pub fn load_type(&self, type_name: &str, path: &Path) -> Result<Object, LoadError> {
        let origin = path.display().to_string();
        let mut context = self.base_context();
        context.set_path(path);
        context.set_type_name(type_name);

        let text = read_source(path)?;
        let rendered = self.render(&text, &context, &origin)?;
        let mut documents = parse_documents(&rendered, &origin)?;
        if documents.len() != 1 {
            return Err(LoadError::DocumentCount {
                origin,
                found: documents.len(),
            });
        }
        let document = documents.remove(0);

        let object = self
            .builder
            .build_named(type_name, &document)
            .map_err(|source| LoadError::Cast {
                origin: origin.clone(),
                type_name: type_name.to_string(),
                source,
            })?;
        tracing::debug!(origin = %origin, type_name = object.type_name(), "typed manifest loaded");
        Ok(object)
    }

    fn base_context(&self) -> RenderContext {
        RenderContext::new(self.vars.clone())
    }

    fn render<'t>(
        &self,
        text: &'t str,
        context: &RenderContext,
        origin: &str,
    ) -> Result<Cow<'t, str>, LoadError> {
        match &self.renderer {
            None => Ok(Cow::Borrowed(text)),
            Some(renderer) => renderer
                .render(text, context)
                .map(Cow::Owned)
                .map_err(|source| LoadError::Render {
                    origin: origin.to_string(),
                    source,
                }),
        }
    }

    fn load_source(
        &self,
        text: &str,
        context: &RenderContext,
        origin: &str,
    ) -> Result<Vec<Object>, LoadError> {
        let rendered = self.render(text, context, origin)?;
        let documents = parse_documents(&rendered, origin)?;

        let mut objects = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            match self.builder.decode(document) {
                Ok(object) => {
                    tracing::debug!(origin, index, type_name = object.type_name(), "document loaded");
                    objects.push(object);
                }
                Err(e) if e.is_unresolved() && self.config.skip_unresolved => {
                    tracing::warn!(origin, index, error = %e, "skipping document of unknown type");
                }
                Err(source) => {
                    return Err(LoadError::Decode {
                        origin: origin.to_string(),
                        index,
                        source,
                    });
                }
            }
        }
        Ok(objects)
    }

    fn manifest_files(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let io_error = |source: std::io::Error| LoadError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if !path.is_file() {
                continue;
            }
            if self.config.matches_extension(&path) {
                files.push(path);
            } else {
                tracing::debug!(path = %path.display(), "ignoring file with unrecognized extension");
            }
        }
        if self.config.sorted {
            files.sort();
        }
        Ok(files)
    }
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Split `text` into YAML documents, expanding `<<` merge keys and
/// dropping empty ones.
fn parse_documents(text: &str, origin: &str) -> Result<Vec<Value>, LoadError> {
    let yaml_error = |source: serde_yaml::Error| LoadError::Yaml {
        origin: origin.to_string(),
        source,
    };
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let mut value = Value::deserialize(document).map_err(yaml_error)?;
        // `is_null` looks through tags; a tagged null is not empty.
        if matches!(value, Value::Null) {
            continue;
        }
        value.apply_merge().map_err(yaml_error)?;
        documents.push(value);
    }
    Ok(documents)
}
