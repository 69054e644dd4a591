//! # Type Descriptors
//!
//! A [`TypeDescriptor`] is the schema of one registered object type: an
//! ordered list of `(internal field, document key, signature)` triples.
//! Keeping the three together makes the "every named field has a signature"
//! invariant hold by construction.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::signature::{SignatureError, TypeSignature};

/// One field of a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    key: String,
    signature: TypeSignature,
}

impl FieldSpec {
    /// A field from an already-parsed signature.
    pub fn new(name: impl Into<String>, key: impl Into<String>, signature: TypeSignature) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            signature,
        }
    }

    /// A field whose signature is given as text.
    pub fn parse(
        name: impl Into<String>,
        key: impl Into<String>,
        signature: &str,
    ) -> Result<Self, SignatureError> {
        Ok(Self::new(name, key, TypeSignature::parse(signature)?))
    }

    /// Internal field identifier (e.g. `api_version`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document key (e.g. `apiVersion`).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// How the field's value is cast.
    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }
}

/// Field layout of one registered object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    fields: Vec<FieldSpec>,
}

impl TypeDescriptor {
    /// A descriptor with no fields yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// A descriptor from a complete field list.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateField`] or [`SchemaError::DuplicateKey`] if
    /// two fields share an internal identifier or a document key.
    pub fn from_fields(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Result<Self, SchemaError> {
        let mut descriptor = Self::new(name);
        for field in fields {
            descriptor.push_field(field)?;
        }
        Ok(descriptor)
    }

    /// Append a field given its signature as text.
    ///
    /// ```
    /// use kubeload_core::TypeDescriptor;
    ///
    /// let meta = TypeDescriptor::new("V1ObjectMeta")
    ///     .with_field("name", "name", "str")?
    ///     .with_field("labels", "labels", "dict(str, str)")?;
    /// assert_eq!(meta.fields().len(), 2);
    /// # Ok::<(), kubeload_core::SchemaError>(())
    /// ```
    pub fn with_field(
        mut self,
        name: &str,
        key: &str,
        signature: &str,
    ) -> Result<Self, SchemaError> {
        let field =
            FieldSpec::parse(name, key, signature).map_err(|source| SchemaError::InvalidSignature {
                type_name: self.name.clone(),
                field: name.to_string(),
                source,
            })?;
        self.push_field(field)?;
        Ok(self)
    }

    fn push_field(&mut self, field: FieldSpec) -> Result<(), SchemaError> {
        if self.field(field.name()).is_some() {
            return Err(SchemaError::DuplicateField {
                type_name: self.name.clone(),
                field: field.name().to_string(),
            });
        }
        if self.fields.iter().any(|f| f.key() == field.key()) {
            return Err(SchemaError::DuplicateKey {
                type_name: self.name.clone(),
                key: field.key().to_string(),
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// The type's name as registered (original casing).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Field by internal identifier.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Distinct nested type names referenced by this type's fields.
    pub fn referenced_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .flat_map(|f| f.signature().nested_names())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}
