//! # Constructed Values
//!
//! [`CastValue`] is the result of casting one raw YAML value against a
//! signature; [`Object`] is a fully constructed instance of a registered
//! type. Objects are only created by the builder, after every field has
//! been cast, so callers never see a partially initialized object.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde_yaml::Value;

/// A value converted to the shape its signature declares.
#[derive(Debug, Clone, PartialEq)]
pub enum CastValue {
    /// `str`.
    Str(String),
    /// `int`.
    Int(i64),
    /// `float`.
    Float(f64),
    /// `bool`.
    Bool(bool),
    /// `bytes`.
    Bytes(Vec<u8>),
    /// `datetime`.
    DateTime(DateTime<Utc>),
    /// `date`.
    Date(NaiveDate),
    /// `object`: the raw value, untouched.
    Any(Value),
    /// `list[T]`.
    List(Vec<CastValue>),
    /// `dict(K, V)`.
    Map(CastMap),
    /// A nested registered type.
    Object(Object),
}

impl CastValue {
    /// The string, if this is a `str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this is an `int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The float, if this is a `float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// The boolean, if this is a `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The elements, if this is a list.
    pub fn as_list(&self) -> Option<&[CastValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a mapping.
    pub fn as_map(&self) -> Option<&CastMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The nested object, if this is one.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The raw value, if this came from an untyped `object` field.
    pub fn as_any(&self) -> Option<&Value> {
        match self {
            Self::Any(v) => Some(v),
            _ => None,
        }
    }
}

/// An ordered mapping produced by a `dict(K, V)` cast.
///
/// Entries keep source order. Inserting a key that is already present
/// replaces the value in place (last write wins). String, integer, boolean
/// and byte keys are found through a hash index; other keys by scanning.
#[derive(Debug, Clone, Default)]
pub struct CastMap {
    entries: Vec<(CastValue, CastValue)>,
    index: HashMap<IndexKey, usize>,
}

/// The hashable subset of [`CastValue`] keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Str(String),
    Int(i64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl IndexKey {
    fn of(value: &CastValue) -> Option<Self> {
        match value {
            CastValue::Str(s) => Some(Self::Str(s.clone())),
            CastValue::Int(i) => Some(Self::Int(*i)),
            CastValue::Bool(b) => Some(Self::Bool(*b)),
            CastValue::Bytes(bytes) => Some(Self::Bytes(bytes.clone())),
            _ => None,
        }
    }
}

impl PartialEq for CastMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl CastMap {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty mapping with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Insert an entry, returning the value it replaced, if any.
    pub fn insert(&mut self, key: CastValue, value: CastValue) -> Option<CastValue> {
        let position = match IndexKey::of(&key) {
            Some(hashed) => match self.index.entry(hashed) {
                Entry::Occupied(slot) => Some(*slot.get()),
                Entry::Vacant(slot) => {
                    slot.insert(self.entries.len());
                    None
                }
            },
            None => self.entries.iter().position(|(k, _)| *k == key),
        };
        match position {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Value for a key.
    pub fn get(&self, key: &CastValue) -> Option<&CastValue> {
        match IndexKey::of(key) {
            Some(hashed) => self.index.get(&hashed).map(|&i| &self.entries[i].1),
            None => self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
        }
    }

    /// Value for a string key.
    pub fn get_str(&self, key: &str) -> Option<&CastValue> {
        self.index
            .get(&IndexKey::Str(key.to_string()))
            .map(|&i| &self.entries[i].1)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&CastValue, &CastValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// A constructed instance of a registered type.
///
/// Holds only the fields that were present in the document, in descriptor
/// order. Fields the document omitted are unset and read back as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    type_name: String,
    fields: Vec<(String, CastValue)>,
}

impl Object {
    pub(crate) fn new(type_name: &str, fields: Vec<(String, CastValue)>) -> Self {
        Self {
            type_name: type_name.to_string(),
            fields,
        }
    }

    /// Name of the registered type this object instantiates.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// A field by internal identifier, `None` when unset.
    pub fn get(&self, field: &str) -> Option<&CastValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Follow a chain of nested object fields, e.g. `["metadata", "name"]`.
    pub fn get_path(&self, path: &[&str]) -> Option<&CastValue> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for field in parents {
            current = current.get(field)?.as_object()?;
        }
        current.get(last)
    }

    /// Whether a field was set from the document.
    pub fn is_set(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Set fields in descriptor order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &CastValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of set fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field was set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ─── Tree Rendering ──────────────────────────────────────────────────

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        write_fields(f, self, 1)
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, obj: &Object, depth: usize) -> fmt::Result {
    for (name, value) in obj.fields() {
        writeln!(f)?;
        write!(f, "{:indent$}{name}:", "", indent = depth * 2)?;
        write_value(f, value, depth)?;
    }
    Ok(())
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &CastValue, depth: usize) -> fmt::Result {
    let pad = (depth + 1) * 2;
    match value {
        CastValue::Object(obj) => {
            write!(f, " {}", obj.type_name())?;
            write_fields(f, obj, depth + 1)
        }
        CastValue::List(items) => {
            if items.is_empty() {
                return write!(f, " []");
            }
            for item in items {
                writeln!(f)?;
                write!(f, "{:pad$}-", "")?;
                write_value(f, item, depth + 1)?;
            }
            Ok(())
        }
        CastValue::Map(map) => {
            if map.is_empty() {
                return write!(f, " {{}}");
            }
            for (k, v) in map.iter() {
                writeln!(f)?;
                write!(f, "{:pad$}", "")?;
                write_scalar(f, k)?;
                write!(f, ":")?;
                write_value(f, v, depth + 1)?;
            }
            Ok(())
        }
        scalar => {
            write!(f, " ")?;
            write_scalar(f, scalar)
        }
    }
}

fn write_scalar(f: &mut fmt::Formatter<'_>, value: &CastValue) -> fmt::Result {
    match value {
        CastValue::Str(s) => write!(f, "{s:?}"),
        CastValue::Int(i) => write!(f, "{i}"),
        CastValue::Float(x) => write!(f, "{x}"),
        CastValue::Bool(b) => write!(f, "{b}"),
        CastValue::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        CastValue::DateTime(ts) => write!(f, "{}", ts.to_rfc3339()),
        CastValue::Date(d) => write!(f, "{d}"),
        CastValue::Any(raw) => match serde_yaml::to_string(raw) {
            Ok(text) => write!(f, "{}", text.trim_end()),
            Err(_) => write!(f, "<opaque>"),
        },
        CastValue::List(_) => write!(f, "<list>"),
        CastValue::Map(_) => write!(f, "<map>"),
        CastValue::Object(obj) => write!(f, "<{}>", obj.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(text: &str) -> CastValue {
        CastValue::Str(text.to_string())
    }

    #[test]
    fn test_map_last_write_wins_in_first_position() {
        let mut map = CastMap::new();
        assert!(map.insert(s("a"), CastValue::Int(1)).is_none());
        assert!(map.insert(s("b"), CastValue::Int(2)).is_none());
        assert_eq!(map.insert(s("a"), CastValue::Int(3)), Some(CastValue::Int(1)));

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![(&s("a"), &CastValue::Int(3)), (&s("b"), &CastValue::Int(2))]);
        assert_eq!(map.get_str("a"), Some(&CastValue::Int(3)));
    }

    #[test]
    fn test_large_map_lookup_and_order() {
        const N: i64 = 50_000;
        let mut map = CastMap::with_capacity(N as usize);
        for i in 0..N {
            map.insert(s(&format!("k{i}")), CastValue::Int(i));
        }
        for i in (1..N).step_by(7) {
            assert_eq!(map.insert(s(&format!("k{i}")), CastValue::Int(-i)), Some(CastValue::Int(i)));
        }
        assert_eq!(map.len(), N as usize);
        assert_eq!(map.get_str("k49999"), Some(&CastValue::Int(49_999)));
        assert_eq!(map.get_str("k8"), Some(&CastValue::Int(-8)));
        assert_eq!(map.iter().nth(8), Some((&s("k8"), &CastValue::Int(-8))));
        assert!(map.get_str("k50000").is_none());
    }

    #[test]
    fn test_unhashable_keys_fall_back_to_scan() {
        let mut map = CastMap::new();
        map.insert(CastValue::Float(1.5), s("a"));
        map.insert(CastValue::Int(1), s("b"));
        assert_eq!(map.insert(CastValue::Float(1.5), s("c")), Some(s("a")));
        assert_eq!(map.get(&CastValue::Float(1.5)), Some(&s("c")));
        assert_eq!(map.get(&CastValue::Int(1)), Some(&s("b")));
        assert!(map.get(&CastValue::Float(1.0)).is_none());
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_object_get_path() {
        let meta = Object::new("V1ObjectMeta", vec![("name".into(), s("web"))]);
        let pod = Object::new(
            "V1Pod",
            vec![
                ("kind".into(), s("Pod")),
                ("metadata".into(), CastValue::Object(meta)),
            ],
        );
        assert_eq!(pod.get_path(&["metadata", "name"]).and_then(CastValue::as_str), Some("web"));
        assert!(pod.get_path(&["kind", "name"]).is_none());
        assert!(pod.get_path(&[]).is_none());
        assert!(!pod.is_set("spec"));
    }

    #[test]
    fn test_display_renders_tree() {
        let meta = Object::new("V1ObjectMeta", vec![("name".into(), s("x"))]);
        let pod = Object::new(
            "V1Pod",
            vec![
                ("kind".into(), s("Pod")),
                ("metadata".into(), CastValue::Object(meta)),
                ("tags".into(), CastValue::List(vec![CastValue::Int(1)])),
            ],
        );
        assert_eq!(
            pod.to_string(),
            "V1Pod\n  kind: \"Pod\"\n  metadata: V1ObjectMeta\n    name: \"x\"\n  tags:\n    - 1"
        );
    }
}
