//! # Schema-Driven Object Builder
//!
//! [`Builder::build`] walks a descriptor's fields in order. For each field
//! it looks up the external key in the raw mapping; absent or null keys
//! leave the field unset, present ones are handed to the caster
//! ([`crate::cast`]) with the field's signature. The [`Object`] is
//! assembled only after every field succeeded.
//!
//! Casting a nested type recurses back into the builder, one level deeper.
//! Depth is bounded by [`BuildOptions::max_depth`] so that a registry with
//! a cyclic type reference fails with an error instead of exhausting the
//! stack.

use serde_yaml::Value;

use crate::descriptor::TypeDescriptor;
use crate::error::{CastError, CastErrorKind, DecodeError, PathSegment};
use crate::registry::TypeRegistry;
use crate::resolve::{resolve_meta, value_kind, TypeMeta};
use crate::value::Object;

/// Default bound on object nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Tunables for construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Deepest nested-object level allowed below the top-level object.
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Builds objects from raw documents using a read-only registry.
#[derive(Debug, Clone, Copy)]
pub struct Builder<'r> {
    registry: &'r TypeRegistry,
    options: BuildOptions,
}

impl<'r> Builder<'r> {
    /// A builder with default options.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self::with_options(registry, BuildOptions::default())
    }

    /// A builder with explicit options.
    pub fn with_options(registry: &'r TypeRegistry, options: BuildOptions) -> Self {
        Self { registry, options }
    }

    /// The registry nested type names are looked up in.
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// The options in effect.
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Build an instance of `descriptor` from a raw mapping.
    ///
    /// # Errors
    ///
    /// [`CastError`] carrying the path of the first field that failed. No
    /// partial object is returned.
    pub fn build(&self, descriptor: &TypeDescriptor, raw: &Value) -> Result<Object, CastError> {
        self.build_at(descriptor, raw, 0)
    }

    /// Build an instance of the type registered under `type_name`.
    pub fn build_named(&self, type_name: &str, raw: &Value) -> Result<Object, CastError> {
        let descriptor = self
            .registry
            .get(type_name)
            .ok_or_else(|| CastError::new(CastErrorKind::UnknownType(type_name.to_string())))?;
        self.build(descriptor, raw)
    }

    /// Resolve a document's type from `apiVersion`/`kind`, then build it.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Malformed`] when either key is missing,
    /// [`DecodeError::UnresolvedType`] when no candidate is registered,
    /// [`DecodeError::Cast`] when construction fails.
    pub fn decode(&self, document: &Value) -> Result<Object, DecodeError> {
        let meta = TypeMeta::from_document(document)?;
        let descriptor =
            resolve_meta(self.registry, &meta).ok_or_else(|| DecodeError::UnresolvedType {
                api_version: meta.api_version.to_string(),
                kind: meta.kind.to_string(),
            })?;
        Ok(self.build(descriptor, document)?)
    }

    pub(crate) fn build_at(
        &self,
        descriptor: &TypeDescriptor,
        raw: &Value,
        depth: usize,
    ) -> Result<Object, CastError> {
        if depth > self.options.max_depth {
            return Err(CastError::new(CastErrorKind::DepthExceeded(
                self.options.max_depth,
            )));
        }
        // `as_mapping` looks through tags; refuse them before it can.
        if let Value::Tagged(tagged) = raw {
            return Err(CastError::new(CastErrorKind::UnexpectedTag(
                tagged.tag.to_string(),
            )));
        }
        let mapping = raw.as_mapping().ok_or_else(|| {
            CastError::new(CastErrorKind::TypeMismatch {
                expected: descriptor.name().to_string(),
                found: value_kind(raw),
            })
        })?;

        let mut fields = Vec::with_capacity(descriptor.fields().len());
        for field in descriptor.fields() {
            let value = match mapping.get(field.key()) {
                None | Some(Value::Null) => continue,
                Some(value) => value,
            };
            let cast = self
                .cast_at(value, field.signature(), depth)
                .map_err(|e| e.within(PathSegment::Field(field.key().to_string())))?;
            fields.push((field.name().to_string(), cast));
        }
        Ok(Object::new(descriptor.name(), fields))
    }
}
