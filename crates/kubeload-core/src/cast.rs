//! # Value Caster
//!
//! Converts one raw YAML value into the shape its [`TypeSignature`]
//! declares. Dispatch is exhaustive, in wrapper-first order:
//!
//! | Signature      | Raw value   | Result                                  |
//! |----------------|-------------|-----------------------------------------|
//! | `list[T]`      | sequence    | each element cast to `T`, order kept    |
//! | `dict(K, V)`   | mapping     | keys cast to `K`, values cast to `V`    |
//! | primitive      | scalar      | direct conversion; `object` passes through |
//! | registered type| mapping     | recursive [`Builder`] construction      |
//!
//! YAML tags are refused everywhere except under `object`: loading never
//! constructs a type because a document asked for it.

use chrono::{DateTime, NaiveDate, Utc};
use serde_yaml::Value;

use crate::build::Builder;
use crate::error::{CastError, CastErrorKind, PathSegment};
use crate::resolve::value_kind;
use crate::signature::{Primitive, TypeSignature};
use crate::value::{CastMap, CastValue};

impl<'r> Builder<'r> {
    /// Cast a raw value against a parsed signature.
    pub fn cast(&self, value: &Value, signature: &TypeSignature) -> Result<CastValue, CastError> {
        self.cast_at(value, signature, 0)
    }

    /// Cast a raw value against a signature given as text.
    ///
    /// # Errors
    ///
    /// [`CastErrorKind::InvalidSignature`] when the text matches no
    /// recognized shape; otherwise as [`cast`](Self::cast).
    pub fn cast_str(&self, value: &Value, signature: &str) -> Result<CastValue, CastError> {
        let signature = TypeSignature::parse(signature).map_err(CastErrorKind::from)?;
        self.cast(value, &signature)
    }

    pub(crate) fn cast_at(
        &self,
        value: &Value,
        signature: &TypeSignature,
        depth: usize,
    ) -> Result<CastValue, CastError> {
        if let Value::Tagged(tagged) = value {
            if *signature != TypeSignature::Primitive(Primitive::Object) {
                return Err(CastErrorKind::UnexpectedTag(tagged.tag.to_string()).into());
            }
        }

        match signature {
            TypeSignature::Collection(element) => {
                let items = value
                    .as_sequence()
                    .ok_or_else(|| mismatch(signature, value))?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        self.cast_at(item, element, depth)
                            .map_err(|e| e.within(PathSegment::Index(i)))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(CastValue::List)
            }
            TypeSignature::Mapping(key_sig, value_sig) => {
                let entries = value
                    .as_mapping()
                    .ok_or_else(|| mismatch(signature, value))?;
                let mut map = CastMap::with_capacity(entries.len());
                for (raw_key, raw_value) in entries {
                    let segment = PathSegment::Key(key_label(raw_key));
                    let key = self
                        .cast_at(raw_key, key_sig, depth)
                        .map_err(|e| e.within(segment.clone()))?;
                    let value = self
                        .cast_at(raw_value, value_sig, depth)
                        .map_err(|e| e.within(segment))?;
                    map.insert(key, value);
                }
                Ok(CastValue::Map(map))
            }
            TypeSignature::Primitive(primitive) => {
                cast_primitive(value, *primitive).map_err(CastError::new)
            }
            TypeSignature::Nested(name) => {
                let descriptor = self
                    .registry()
                    .get(name)
                    .ok_or_else(|| CastError::new(CastErrorKind::UnknownType(name.clone())))?;
                self.build_at(descriptor, value, depth + 1)
                    .map(CastValue::Object)
            }
        }
    }
}

fn mismatch(expected: impl ToString, found: &Value) -> CastError {
    CastError::new(CastErrorKind::TypeMismatch {
        expected: expected.to_string(),
        found: value_kind(found),
    })
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => format!("<{}>", value_kind(other)),
    }
}

fn invalid(primitive: Primitive, value: &str, reason: impl ToString) -> CastErrorKind {
    CastErrorKind::InvalidPrimitive {
        primitive,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn cast_primitive(value: &Value, primitive: Primitive) -> Result<CastValue, CastErrorKind> {
    let wrong_shape = || CastErrorKind::TypeMismatch {
        expected: primitive.to_string(),
        found: value_kind(value),
    };

    match primitive {
        Primitive::Object => Ok(CastValue::Any(value.clone())),
        Primitive::Str => match value {
            Value::String(s) => Ok(CastValue::Str(s.clone())),
            Value::Number(n) => Ok(CastValue::Str(n.to_string())),
            Value::Bool(b) => Ok(CastValue::Str(b.to_string())),
            _ => Err(wrong_shape()),
        },
        Primitive::Int => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(CastValue::Int(i))
                } else if n.is_u64() {
                    Err(invalid(primitive, &n.to_string(), "out of range for a 64-bit integer"))
                } else {
                    float_to_int(n.as_f64().unwrap_or(f64::NAN))
                        .map(CastValue::Int)
                        .ok_or_else(|| invalid(primitive, &n.to_string(), "not a finite in-range number"))
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(CastValue::Int)
                .map_err(|e| invalid(primitive, s, e)),
            Value::Bool(b) => Ok(CastValue::Int(i64::from(*b))),
            _ => Err(wrong_shape()),
        },
        Primitive::Float => match value {
            Value::Number(n) => n
                .as_f64()
                .map(CastValue::Float)
                .ok_or_else(|| invalid(primitive, &n.to_string(), "not representable as f64")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(CastValue::Float)
                .map_err(|e| invalid(primitive, s, e)),
            Value::Bool(b) => Ok(CastValue::Float(if *b { 1.0 } else { 0.0 })),
            _ => Err(wrong_shape()),
        },
        Primitive::Bool => match value {
            Value::Bool(b) => Ok(CastValue::Bool(*b)),
            Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(CastValue::Bool(true)),
            Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(CastValue::Bool(false)),
            Value::String(s) => Err(invalid(primitive, s, "expected true or false")),
            _ => Err(wrong_shape()),
        },
        Primitive::Bytes => match value {
            Value::String(s) => Ok(CastValue::Bytes(s.as_bytes().to_vec())),
            _ => Err(wrong_shape()),
        },
        Primitive::DateTime => match value {
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|ts| CastValue::DateTime(ts.with_timezone(&Utc)))
                .map_err(|e| invalid(primitive, s, e)),
            _ => Err(wrong_shape()),
        },
        Primitive::Date => match value {
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(CastValue::Date)
                .map_err(|e| invalid(primitive, s, e)),
            _ => Err(wrong_shape()),
        },
    }
}

/// Truncate toward zero; `None` for NaN, infinities, and out-of-range values.
fn float_to_int(x: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if x.is_finite() && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x.trunc() as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::registry::TypeRegistry;
    use chrono::TimeZone;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn cast(text: &str, signature: &str) -> Result<CastValue, CastError> {
        let reg = container_registry();
        Builder::new(&reg).cast_str(&yaml(text), signature)
    }

    fn container_registry() -> TypeRegistry {
        let port = TypeDescriptor::new("V1ContainerPort")
            .with_field("container_port", "containerPort", "int")
            .unwrap()
            .with_field("protocol", "protocol", "str")
            .unwrap();
        let container = TypeDescriptor::new("V1Container")
            .with_field("name", "name", "str")
            .unwrap()
            .with_field("ports", "ports", "list[V1ContainerPort]")
            .unwrap();
        TypeRegistry::builder()
            .with(port)
            .unwrap()
            .with(container)
            .unwrap()
            .build()
    }

    // ── Primitives ───────────────────────────────────────────────────

    #[test]
    fn test_str_from_scalars() {
        assert_eq!(cast("hello", "str").unwrap(), CastValue::Str("hello".into()));
        assert_eq!(cast("42", "str").unwrap(), CastValue::Str("42".into()));
        assert_eq!(cast("true", "str").unwrap(), CastValue::Str("true".into()));
        assert!(cast("[1]", "str").is_err());
        assert!(cast("~", "str").is_err());
    }

    #[test]
    fn test_int_conversions() {
        assert_eq!(cast("8080", "int").unwrap(), CastValue::Int(8080));
        assert_eq!(cast("'8080'", "int").unwrap(), CastValue::Int(8080));
        assert_eq!(cast("' 7 '", "int").unwrap(), CastValue::Int(7));
        assert_eq!(cast("5.9", "int").unwrap(), CastValue::Int(5));
        assert_eq!(cast("-5.9", "int").unwrap(), CastValue::Int(-5));
        assert_eq!(cast("true", "int").unwrap(), CastValue::Int(1));
        assert!(matches!(
            cast("'eighty'", "int").unwrap_err().kind(),
            CastErrorKind::InvalidPrimitive { primitive: Primitive::Int, .. }
        ));
        assert!(cast("18446744073709551615", "int").is_err());
        assert!(cast(".inf", "int").is_err());
    }

    #[test]
    fn test_float_conversions() {
        assert_eq!(cast("1.5", "float").unwrap(), CastValue::Float(1.5));
        assert_eq!(cast("3", "float").unwrap(), CastValue::Float(3.0));
        assert_eq!(cast("'0.25'", "float").unwrap(), CastValue::Float(0.25));
        assert!(cast("{}", "float").is_err());
    }

    #[test]
    fn test_bool_conversions() {
        assert_eq!(cast("false", "bool").unwrap(), CastValue::Bool(false));
        assert_eq!(cast("'TRUE'", "bool").unwrap(), CastValue::Bool(true));
        assert!(cast("'yes'", "bool").is_err());
        assert!(cast("1", "bool").is_err());
    }

    #[test]
    fn test_bytes_datetime_date() {
        assert_eq!(cast("abc", "bytes").unwrap(), CastValue::Bytes(b"abc".to_vec()));
        assert_eq!(
            cast("2024-03-01T12:00:00+02:00", "datetime").unwrap(),
            CastValue::DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
        assert_eq!(
            cast("2024-03-01", "date").unwrap(),
            CastValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert!(cast("yesterday", "datetime").is_err());
        assert!(cast("2024-13-01", "date").is_err());
    }

    #[test]
    fn test_object_passes_through_unchanged() {
        let raw = yaml("{a: [1, 2], b: ~}");
        let reg = container_registry();
        assert_eq!(
            Builder::new(&reg).cast_str(&raw, "object").unwrap(),
            CastValue::Any(raw.clone())
        );
        // Int-or-string fields are declared as object.
        assert_eq!(cast("http", "object").unwrap(), CastValue::Any(yaml("http")));
    }

    // ── Wrappers ─────────────────────────────────────────────────────

    #[test]
    fn test_list_preserves_order() {
        assert_eq!(
            cast("[c, a, b]", "list[str]").unwrap(),
            CastValue::List(vec![
                CastValue::Str("c".into()),
                CastValue::Str("a".into()),
                CastValue::Str("b".into()),
            ])
        );
    }

    #[test]
    fn test_list_requires_sequence() {
        let err = cast("abc", "list[str]").unwrap_err();
        assert_eq!(
            err.kind(),
            &CastErrorKind::TypeMismatch {
                expected: "list[str]".into(),
                found: "string",
            }
        );
    }

    #[test]
    fn test_list_error_carries_index() {
        let err = cast("[1, 2, x]", "list[int]").unwrap_err();
        assert_eq!(err.path().to_string(), "[2]");
    }

    #[test]
    fn test_dict_casts_keys_and_values() {
        let value = cast("{1: '10', 2: '20'}", "dict(str, int)").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_str("1"), Some(&CastValue::Int(10)));
        assert_eq!(map.get_str("2"), Some(&CastValue::Int(20)));
    }

    #[test]
    fn test_dict_key_collision_last_write_wins() {
        let value = cast("{1: first, '1': second, 2: other}", "dict(str, str)").unwrap();
        let map = value.as_map().unwrap();
        let entries: Vec<_> = map
            .iter()
            .map(|(k, v)| (k.as_str().unwrap(), v.as_str().unwrap()))
            .collect();
        assert_eq!(entries, vec![("1", "second"), ("2", "other")]);
    }

    #[test]
    fn test_large_dict_casts_every_key() {
        let entries: Vec<String> = (0..20_000).map(|i| format!("key{i}: '{i}'")).collect();
        let value = cast(&format!("{{{}}}", entries.join(", ")), "dict(str, int)").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 20_000);
        assert_eq!(map.get_str("key0"), Some(&CastValue::Int(0)));
        assert_eq!(map.get_str("key19999"), Some(&CastValue::Int(19_999)));
    }

    #[test]
    fn test_nested_wrappers() {
        let value = cast("{a: [1, 2], b: []}", "dict(str, list[int])").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(
            map.get_str("a"),
            Some(&CastValue::List(vec![CastValue::Int(1), CastValue::Int(2)]))
        );
        assert_eq!(map.get_str("b"), Some(&CastValue::List(vec![])));
    }

    // ── Nested objects ───────────────────────────────────────────────

    #[test]
    fn test_nested_type_is_built_not_left_raw() {
        let value = cast(
            "{name: web, ports: [{containerPort: 80}, {containerPort: '443', protocol: TCP}]}",
            "V1Container",
        )
        .unwrap();
        let container = value.as_object().unwrap();
        let ports = container.get("ports").and_then(CastValue::as_list).unwrap();
        let second = ports[1].as_object().unwrap();
        assert_eq!(second.type_name(), "V1ContainerPort");
        assert_eq!(second.get("container_port"), Some(&CastValue::Int(443)));
        assert_eq!(second.get("protocol").and_then(CastValue::as_str), Some("TCP"));
    }

    #[test]
    fn test_nested_type_lookup_ignores_case() {
        assert!(cast("{name: x}", "v1container").unwrap().as_object().is_some());
    }

    #[test]
    fn test_unknown_bare_type() {
        let err = cast("{}", "V1Unknown").unwrap_err();
        assert_eq!(err.kind(), &CastErrorKind::UnknownType("V1Unknown".into()));
    }

    #[test]
    fn test_invalid_signature_is_cast_error() {
        let err = cast("[a]", "list[str").unwrap_err();
        assert!(matches!(err.kind(), CastErrorKind::InvalidSignature(_)));
    }

    #[test]
    fn test_deep_error_path() {
        let err = cast(
            "{ports: [{containerPort: 80}, {containerPort: http}]}",
            "V1Container",
        )
        .unwrap_err();
        assert_eq!(err.path().to_string(), "ports[1].containerPort");
    }

    // ── Tags ─────────────────────────────────────────────────────────

    #[test]
    fn test_tagged_values_rejected_except_for_object() {
        let err = cast("!secret hunter2", "str").unwrap_err();
        assert!(matches!(err.kind(), CastErrorKind::UnexpectedTag(tag) if tag.contains("secret")));
        assert!(cast("!secret hunter2", "object").is_ok());
    }

    #[test]
    fn test_float_to_int_bounds() {
        assert_eq!(float_to_int(-0.5), Some(0));
        assert_eq!(float_to_int(f64::NAN), None);
        assert_eq!(float_to_int(9.3e18), None);
    }
}
