//! # Type Resolution
//!
//! Maps a document's `apiVersion` and `kind` to a registered type. There
//! is no table from API group to type; instead candidate type names are
//! synthesized and probed case-insensitively:
//!
//! 1. the version with `/` and `.` removed, followed by the kind
//!    (`apps/v1` + `Deployment` → `appsv1Deployment`);
//! 2. when the version has exactly one `/`, the part after it followed
//!    by the kind (`apps/v1` + `Deployment` → `v1Deployment`).
//!
//! The first candidate that is registered wins. Group-prefixed names come
//! first because they are less likely to collide across API groups.

use serde_yaml::{Mapping, Value};

use crate::descriptor::TypeDescriptor;
use crate::error::ResolveError;
use crate::registry::TypeRegistry;

/// Document key holding the API group/version.
pub const API_VERSION_KEY: &str = "apiVersion";
/// Document key holding the object kind.
pub const KIND_KEY: &str = "kind";

/// The `apiVersion`/`kind` pair of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMeta<'a> {
    /// e.g. `apps/v1`.
    pub api_version: &'a str,
    /// e.g. `Deployment`.
    pub kind: &'a str,
}

impl<'a> TypeMeta<'a> {
    /// Extract the pair from a parsed document.
    ///
    /// # Errors
    ///
    /// [`ResolveError::NotAMapping`] if the document is not a mapping;
    /// [`ResolveError::MissingField`] if either key is absent, null, or not
    /// a string; [`ResolveError::UnexpectedTag`] if the document or either
    /// value is tagged. `apiVersion` is checked first.
    pub fn from_document(document: &'a Value) -> Result<Self, ResolveError> {
        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Tagged(tagged) => return Err(ResolveError::UnexpectedTag(tagged.tag.to_string())),
            other => return Err(ResolveError::NotAMapping(value_kind(other))),
        };
        let api_version = string_field(mapping, API_VERSION_KEY)?;
        let kind = string_field(mapping, KIND_KEY)?;
        Ok(Self { api_version, kind })
    }

    /// Candidate type names for this pair, in priority order.
    pub fn candidate_names(&self) -> Vec<String> {
        candidate_names(self.api_version, self.kind)
    }
}

/// Candidate type names for a version/kind pair, in priority order.
pub fn candidate_names(api_version: &str, kind: &str) -> Vec<String> {
    let flattened: String = api_version.chars().filter(|c| !matches!(c, '/' | '.')).collect();
    let mut candidates = vec![format!("{flattened}{kind}")];

    if api_version.matches('/').count() == 1 {
        if let Some((_, version)) = api_version.split_once('/') {
            candidates.push(format!("{version}{kind}"));
        }
    }
    candidates
}

/// Resolve an already extracted pair.
pub fn resolve_meta<'r>(registry: &'r TypeRegistry, meta: &TypeMeta<'_>) -> Option<&'r TypeDescriptor> {
    meta.candidate_names()
        .iter()
        .find_map(|candidate| registry.get(candidate))
}

/// Resolve the registered type a document should be built into.
///
/// Returns `Ok(None)` when the document is well-formed but no candidate
/// is registered.
///
/// # Errors
///
/// [`ResolveError`] if the document lacks `apiVersion` or `kind`; the
/// registry is not consulted in that case.
pub fn resolve<'r>(
    registry: &'r TypeRegistry,
    document: &Value,
) -> Result<Option<&'r TypeDescriptor>, ResolveError> {
    let meta = TypeMeta::from_document(document)?;
    Ok(resolve_meta(registry, &meta))
}

// `Value::as_str` looks through tags, so match the variant directly.
fn string_field<'a>(mapping: &'a Mapping, key: &'static str) -> Result<&'a str, ResolveError> {
    match mapping.get(key) {
        Some(Value::String(text)) => Ok(text.as_str()),
        Some(Value::Tagged(tagged)) => Err(ResolveError::UnexpectedTag(tagged.tag.to_string())),
        _ => Err(ResolveError::MissingField(key)),
    }
}

/// Short name for the kind of a YAML value, used in error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn registry(names: &[&str]) -> TypeRegistry {
        let mut builder = TypeRegistry::builder();
        for name in names {
            builder.register(TypeDescriptor::new(*name)).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_candidates_for_grouped_version() {
        assert_eq!(
            candidate_names("apps/v1", "Deployment"),
            vec!["appsv1Deployment", "v1Deployment"]
        );
        assert_eq!(
            candidate_names("extensions/v1beta1", "Ingress"),
            vec!["extensionsv1beta1Ingress", "v1beta1Ingress"]
        );
    }

    #[test]
    fn test_candidates_for_core_version() {
        assert_eq!(candidate_names("v1", "Pod"), vec!["v1Pod"]);
    }

    #[test]
    fn test_candidates_strip_dots() {
        assert_eq!(
            candidate_names("rbac.authorization.k8s.io/v1", "Role"),
            vec!["rbacauthorizationk8siov1Role", "v1Role"]
        );
    }

    #[test]
    fn test_no_suffix_candidate_with_two_slashes() {
        assert_eq!(candidate_names("a/b/v1", "X"), vec!["abv1X"]);
    }

    #[test]
    fn test_prefixed_candidate_wins() {
        let reg = registry(&["AppsV1Deployment", "V1Deployment"]);
        let d = resolve(&reg, &doc("apiVersion: apps/v1\nkind: Deployment")).unwrap();
        assert_eq!(d.unwrap().name(), "AppsV1Deployment");
    }

    #[test]
    fn test_falls_back_to_suffix_candidate() {
        let reg = registry(&["V1Deployment"]);
        let d = resolve(&reg, &doc("apiVersion: apps/v1\nkind: Deployment")).unwrap();
        assert_eq!(d.unwrap().name(), "V1Deployment");
    }

    #[test]
    fn test_unresolved_is_none_not_error() {
        let reg = registry(&["V1Pod"]);
        let d = resolve(&reg, &doc("apiVersion: example.com/v9\nkind: Widget")).unwrap();
        assert!(d.is_none());
    }

    #[test]
    fn test_missing_api_version_is_malformed() {
        let reg = registry(&["V1Pod"]);
        let err = resolve(&reg, &doc("kind: Pod")).unwrap_err();
        assert_eq!(err, ResolveError::MissingField("apiVersion"));
    }

    #[test]
    fn test_tagged_document_is_rejected() {
        let reg = registry(&["V1Pod"]);
        let err = resolve(&reg, &doc("!!python/object:os.system\napiVersion: v1\nkind: Pod\n"))
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnexpectedTag(tag) if tag.contains("python/object")));
    }

    #[test]
    fn test_tagged_kind_is_rejected() {
        let reg = registry(&["V1Pod"]);
        let err = resolve(&reg, &doc("apiVersion: v1\nkind: !custom Pod\n")).unwrap_err();
        assert!(matches!(err, ResolveError::UnexpectedTag(tag) if tag.contains("custom")));
    }

    #[test]
    fn test_missing_kind_is_malformed() {
        let reg = registry(&["V1Pod"]);
        let err = resolve(&reg, &doc("apiVersion: v1")).unwrap_err();
        assert_eq!(err, ResolveError::MissingField("kind"));
    }

    #[test]
    fn test_null_and_non_string_fields_count_as_missing() {
        let reg = registry(&["V1Pod"]);
        assert_eq!(
            resolve(&reg, &doc("apiVersion: ~\nkind: Pod")).unwrap_err(),
            ResolveError::MissingField("apiVersion")
        );
        assert_eq!(
            resolve(&reg, &doc("apiVersion: v1\nkind: [Pod]")).unwrap_err(),
            ResolveError::MissingField("kind")
        );
    }

    #[test]
    fn test_non_mapping_document() {
        let reg = registry(&["V1Pod"]);
        assert_eq!(
            resolve(&reg, &doc("- a\n- b")).unwrap_err(),
            ResolveError::NotAMapping("sequence")
        );
    }
}
