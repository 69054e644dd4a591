//! # Type Signatures
//!
//! A field's type signature is one of three textual shapes:
//!
//! ```text
//! list[T]        collection of T
//! dict(K, V)     mapping from K to V
//! Name           primitive (str, int, ...) or nested registered type
//! ```
//!
//! Wrappers nest (`dict(str, list[V1Volume])`). Signatures are parsed once,
//! when a descriptor is assembled, into a [`TypeSignature`] so that casting
//! never re-parses text.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A signature string that matches none of the recognized shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed type signature '{signature}': {reason}")]
pub struct SignatureError {
    /// The full signature as written.
    pub signature: String,
    /// What is wrong with it.
    pub reason: String,
}

impl SignatureError {
    fn new(signature: &str, reason: impl Into<String>) -> Self {
        Self {
            signature: signature.to_string(),
            reason: reason.into(),
        }
    }
}

/// Scalar types a value can be converted to directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Text.
    Str,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Raw bytes (UTF-8 of the source string).
    Bytes,
    /// RFC 3339 timestamp, normalized to UTC.
    DateTime,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Untyped: the raw value passes through unchanged.
    Object,
}

impl Primitive {
    /// All primitives, in declaration order.
    pub const ALL: [Primitive; 8] = [
        Self::Str,
        Self::Int,
        Self::Float,
        Self::Bool,
        Self::Bytes,
        Self::DateTime,
        Self::Date,
        Self::Object,
    ];

    /// Look up a primitive by its signature name. Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The name used for this primitive in signatures.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
            Self::DateTime => "datetime",
            Self::Date => "date",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed field type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    /// A scalar conversion.
    Primitive(Primitive),
    /// `list[T]`.
    Collection(Box<TypeSignature>),
    /// `dict(K, V)`.
    Mapping(Box<TypeSignature>, Box<TypeSignature>),
    /// A type name to be looked up in the registry at cast time.
    Nested(String),
}

impl TypeSignature {
    /// Parse a signature string.
    ///
    /// Shapes are tried in order: collection, mapping, bare name. A bare
    /// name that is a primitive becomes [`TypeSignature::Primitive`];
    /// any other identifier becomes [`TypeSignature::Nested`].
    pub fn parse(signature: &str) -> Result<Self, SignatureError> {
        parse_shape(signature, signature)
    }

    /// Names of every nested type this signature refers to.
    pub fn nested_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_nested(&mut names);
        names
    }

    fn collect_nested<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Primitive(_) => {}
            Self::Collection(element) => element.collect_nested(out),
            Self::Mapping(key, value) => {
                key.collect_nested(out);
                value.collect_nested(out);
            }
            Self::Nested(name) => out.push(name),
        }
    }
}

impl FromStr for TypeSignature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Collection(element) => write!(f, "list[{element}]"),
            Self::Mapping(key, value) => write!(f, "dict({key}, {value})"),
            Self::Nested(name) => f.write_str(name),
        }
    }
}

fn parse_shape(raw: &str, full: &str) -> Result<TypeSignature, SignatureError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(SignatureError::new(full, "empty type name"));
    }

    if let Some(inner) = s.strip_prefix("list[").and_then(|r| r.strip_suffix(']')) {
        let element = parse_shape(inner, full)?;
        return Ok(TypeSignature::Collection(Box::new(element)));
    }

    if let Some(inner) = s.strip_prefix("dict(").and_then(|r| r.strip_suffix(')')) {
        let split = top_level_comma(inner)
            .ok_or_else(|| SignatureError::new(full, "mapping needs a key type and a value type"))?;
        let key = parse_shape(&inner[..split], full)?;
        let value = parse_shape(&inner[split + 1..], full)?;
        return Ok(TypeSignature::Mapping(Box::new(key), Box::new(value)));
    }

    if is_identifier(s) {
        return Ok(match Primitive::from_name(s) {
            Some(p) => TypeSignature::Primitive(p),
            None => TypeSignature::Nested(s.to_string()),
        });
    }

    Err(SignatureError::new(
        full,
        format!("'{s}' is not list[T], dict(K, V), or a type name"),
    ))
}

/// Byte offset of the first comma not enclosed in brackets or parentheses.
fn top_level_comma(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
