//! # Type Registry
//!
//! Read-only catalog of [`TypeDescriptor`]s keyed by lower-cased type name.
//! A [`RegistryBuilder`] collects descriptors at startup and is frozen into
//! a [`TypeRegistry`], which is then passed by reference to the resolver
//! and builder. Nothing mutates a registry after `build()`.
//!
//! ## Thread Safety
//!
//! `TypeRegistry` is `Send + Sync`; share it behind `&` or `Arc`.

use std::collections::BTreeMap;

use crate::descriptor::TypeDescriptor;
use crate::error::SchemaError;

/// Collects descriptors before freezing them into a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: BTreeMap<String, TypeDescriptor>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateType`] if a type with the same name, ignoring
    /// case, is already present.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<&mut Self, SchemaError> {
        let key = descriptor.name().to_lowercase();
        if let Some(existing) = self.types.get(&key) {
            return Err(SchemaError::DuplicateType {
                name: descriptor.name().to_string(),
                existing: existing.name().to_string(),
            });
        }
        self.types.insert(key, descriptor);
        Ok(self)
    }

    /// Owned-chaining form of [`register`](Self::register).
    pub fn with(mut self, descriptor: TypeDescriptor) -> Result<Self, SchemaError> {
        self.register(descriptor)?;
        Ok(self)
    }

    /// Number of descriptors collected so far.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Freeze into an immutable registry.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry { types: self.types }
    }
}

/// A nested type name that a field refers to but the registry lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Type declaring the field.
    pub type_name: String,
    /// Internal field identifier.
    pub field: String,
    /// Missing type name.
    pub missing: String,
}

/// Immutable, case-insensitive catalog of type descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Start collecting descriptors.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Descriptor by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(&name.to_lowercase())
    }

    /// Whether a type with this name (ignoring case) is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Descriptors ordered by lower-cased name.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Every field whose signature names a type the registry does not hold.
    ///
    /// Such fields still load when absent from a document; they fail with
    /// an unknown-type cast error only when a value is present.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for descriptor in self.iter() {
            for field in descriptor.fields() {
                for name in field.signature().nested_names() {
                    if !self.contains(name) {
                        dangling.push(DanglingReference {
                            type_name: descriptor.name().to_string(),
                            field: field.name().to_string(),
                            missing: name.to_string(),
                        });
                    }
                }
            }
        }
        dangling
    }
}
