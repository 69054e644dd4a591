//! # Catalog Loading
//!
//! Reads catalog text into [`TypeDescriptor`]s and collects them into a
//! registry. Loading happens once at startup; the resulting
//! [`TypeRegistry`] is immutable.

use std::path::Path;

use kubeload_core::{FieldSpec, RegistryBuilder, SchemaError, TypeDescriptor, TypeRegistry};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::CatalogError;

/// The bundled core catalog (common `v1` and `apps/v1` objects).
pub const BUILTIN_CATALOG: &str = include_str!("../catalog/core.yaml");

/// File extensions recognized when reading a catalog directory.
const CATALOG_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    types: Mapping,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TypeEntry {
    attribute_map: Mapping,
    #[serde(alias = "swagger_types")]
    openapi_types: Mapping,
}

/// Parse catalog text into descriptors, in the order the text lists them.
///
/// `origin` names the source in error messages (usually a file path).
///
/// # Errors
///
/// [`CatalogError::Parse`] for malformed text or non-string names,
/// [`CatalogError::MissingSignature`]/[`CatalogError::MissingKey`] when the
/// two tables disagree, [`CatalogError::Schema`] for invalid signatures or
/// duplicate fields.
pub fn parse_catalog(text: &str, origin: &str) -> Result<Vec<TypeDescriptor>, CatalogError> {
    let file: CatalogFile = serde_yaml::from_str(text).map_err(|e| CatalogError::Parse {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    let mut descriptors = Vec::with_capacity(file.types.len());
    for (name, entry) in file.types {
        let name = expect_str(&name, origin, "type names")?.to_string();
        let entry: TypeEntry = serde_yaml::from_value(entry).map_err(|e| CatalogError::Parse {
            origin: origin.to_string(),
            reason: format!("type {name}: {e}"),
        })?;
        descriptors.push(descriptor_from_entry(&name, &entry, origin)?);
    }
    Ok(descriptors)
}

fn descriptor_from_entry(
    type_name: &str,
    entry: &TypeEntry,
    origin: &str,
) -> Result<TypeDescriptor, CatalogError> {
    let schema_error = |source: SchemaError| CatalogError::Schema {
        origin: origin.to_string(),
        source,
    };

    let mut fields = Vec::with_capacity(entry.attribute_map.len());
    for (field, key) in &entry.attribute_map {
        let field = expect_str(field, origin, "field identifiers")?;
        let key = expect_str(key, origin, "document keys")?;
        let signature = entry
            .openapi_types
            .get(field)
            .ok_or_else(|| CatalogError::MissingSignature {
                origin: origin.to_string(),
                type_name: type_name.to_string(),
                field: field.to_string(),
            })?;
        let signature = expect_str(signature, origin, "type signatures")?;
        let spec = FieldSpec::parse(field, key, signature).map_err(|source| {
            schema_error(SchemaError::InvalidSignature {
                type_name: type_name.to_string(),
                field: field.to_string(),
                source,
            })
        })?;
        fields.push(spec);
    }

    for field in entry.openapi_types.keys() {
        if !entry.attribute_map.contains_key(field) {
            return Err(CatalogError::MissingKey {
                origin: origin.to_string(),
                type_name: type_name.to_string(),
                field: expect_str(field, origin, "field identifiers")?.to_string(),
            });
        }
    }

    TypeDescriptor::from_fields(type_name, fields).map_err(schema_error)
}

fn expect_str<'a>(value: &'a Value, origin: &str, what: &str) -> Result<&'a str, CatalogError> {
    value.as_str().ok_or_else(|| CatalogError::Parse {
        origin: origin.to_string(),
        reason: format!("{what} must be strings"),
    })
}

/// Accumulates catalogs from several sources into one registry.
#[derive(Debug, Default)]
pub struct Catalog {
    builder: RegistryBuilder,
}

impl Catalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every type in `text`. Returns how many types were added.
    pub fn add_str(&mut self, text: &str, origin: &str) -> Result<usize, CatalogError> {
        let descriptors = parse_catalog(text, origin)?;
        let count = descriptors.len();
        for descriptor in descriptors {
            self.builder
                .register(descriptor)
                .map_err(|source| CatalogError::Schema {
                    origin: origin.to_string(),
                    source,
                })?;
        }
        tracing::debug!(origin, types = count, "catalog loaded");
        Ok(count)
    }

    /// Add the bundled core catalog.
    pub fn add_builtin(&mut self) -> Result<usize, CatalogError> {
        self.add_str(BUILTIN_CATALOG, "<builtin>")
    }

    /// Add one catalog file.
    pub fn add_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.add_str(&text, &path.display().to_string())
    }

    /// Add every `.yaml`, `.yml`, or `.json` file directly inside `dir`, in
    /// file-name order. Subdirectories are not descended into.
    pub fn add_dir(&mut self, dir: &Path) -> Result<usize, CatalogError> {
        let io_error = |source: std::io::Error| CatalogError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let recognized = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| CATALOG_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if path.is_file() && recognized {
                files.push(path);
            }
        }
        files.sort();

        let mut total = 0;
        for file in &files {
            total += self.add_file(file)?;
        }
        Ok(total)
    }

    /// Add a catalog file, or every catalog file in a directory.
    pub fn add_path(&mut self, path: &Path) -> Result<usize, CatalogError> {
        if path.is_dir() {
            self.add_dir(path)
        } else {
            self.add_file(path)
        }
    }

    /// Number of types collected.
    pub fn len(&self) -> usize {
        self.builder.len()
    }

    /// Whether no type has been collected.
    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// Freeze into an immutable registry.
    pub fn into_registry(self) -> TypeRegistry {
        let registry = self.builder.build();
        for dangling in registry.dangling_references() {
            tracing::debug!(
                type_name = %dangling.type_name,
                field = %dangling.field,
                missing = %dangling.missing,
                "field refers to a type the catalog does not define"
            );
        }
        registry
    }
}

/// Registry holding only the bundled core catalog.
pub fn builtin_registry() -> Result<TypeRegistry, CatalogError> {
    let mut catalog = Catalog::new();
    catalog.add_builtin()?;
    Ok(catalog.into_registry())
}

/// Registry from catalog files and directories, in the order given.
pub fn load_registry<P: AsRef<Path>>(paths: &[P]) -> Result<TypeRegistry, CatalogError> {
    let mut catalog = Catalog::new();
    for path in paths {
        catalog.add_path(path.as_ref())?;
    }
    Ok(catalog.into_registry())
}
