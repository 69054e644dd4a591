//! Integration tests: resolution priority, determinism, and order
//! preservation over a small Kubernetes-shaped registry.

use kubeload_core::{
    resolve, Builder, CastErrorKind, CastValue, DecodeError, ResolveError, TypeDescriptor,
    TypeRegistry,
};
use proptest::prelude::*;
use serde_yaml::Value;

fn registry() -> TypeRegistry {
    let meta = TypeDescriptor::new("V1ObjectMeta")
        .with_field("name", "name", "str")
        .unwrap()
        .with_field("namespace", "namespace", "str")
        .unwrap()
        .with_field("labels", "labels", "dict(str, str)")
        .unwrap()
        .with_field("finalizers", "finalizers", "list[str]")
        .unwrap();
    let pod = TypeDescriptor::new("V1Pod")
        .with_field("api_version", "apiVersion", "str")
        .unwrap()
        .with_field("kind", "kind", "str")
        .unwrap()
        .with_field("metadata", "metadata", "V1ObjectMeta")
        .unwrap();
    let apps_deployment = TypeDescriptor::new("AppsV1Deployment")
        .with_field("kind", "kind", "str")
        .unwrap()
        .with_field("metadata", "metadata", "V1ObjectMeta")
        .unwrap()
        .with_field("replicas", "replicas", "int")
        .unwrap();
    let v1_deployment = TypeDescriptor::new("V1Deployment")
        .with_field("kind", "kind", "str")
        .unwrap();
    TypeRegistry::builder()
        .with(meta)
        .unwrap()
        .with(pod)
        .unwrap()
        .with(apps_deployment)
        .unwrap()
        .with(v1_deployment)
        .unwrap()
        .build()
}

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

#[test]
fn test_version_prefixed_candidate_preferred() {
    let reg = registry();
    let doc = yaml("apiVersion: apps/v1\nkind: Deployment\n");
    assert_eq!(resolve(&reg, &doc).unwrap().unwrap().name(), "AppsV1Deployment");
}

#[test]
fn test_pod_end_to_end() {
    let reg = registry();
    let doc = yaml("apiVersion: v1\nkind: Pod\nmetadata:\n  name: x\n");
    assert_eq!(resolve(&reg, &doc).unwrap().unwrap().name(), "V1Pod");

    let pod = Builder::new(&reg).decode(&doc).unwrap();
    assert_eq!(pod.get("kind").and_then(CastValue::as_str), Some("Pod"));
    assert_eq!(pod.get("api_version").and_then(CastValue::as_str), Some("v1"));
    assert_eq!(
        pod.get_path(&["metadata", "name"]).and_then(CastValue::as_str),
        Some("x")
    );
    assert!(pod.get_path(&["metadata", "labels"]).is_none());
}

#[test]
fn test_missing_api_version_is_malformed_input() {
    let reg = registry();
    let err = Builder::new(&reg).decode(&yaml("kind: Pod\n")).unwrap_err();
    assert_eq!(err, DecodeError::Malformed(ResolveError::MissingField("apiVersion")));
}

#[test]
fn test_unknown_pair_is_not_found() {
    let reg = registry();
    let doc = yaml("apiVersion: batch/v1\nkind: CronJob\n");
    assert!(resolve(&reg, &doc).unwrap().is_none());
    assert!(Builder::new(&reg).decode(&doc).unwrap_err().is_unresolved());
}

#[test]
fn test_cast_failure_propagates_to_top_level() {
    let reg = registry();
    let doc = yaml("apiVersion: apps/v1\nkind: Deployment\nmetadata: {name: web}\nreplicas: many\n");
    match Builder::new(&reg).decode(&doc).unwrap_err() {
        DecodeError::Cast(e) => {
            assert_eq!(e.path().to_string(), "replicas");
            assert!(matches!(e.kind(), CastErrorKind::InvalidPrimitive { .. }));
        }
        other => panic!("expected cast error, got {other:?}"),
    }
}

proptest! {
    #[test]
    fn prop_build_is_deterministic(
        name in "[a-z][a-z0-9-]{0,20}",
        labels in proptest::collection::vec(("k[a-z]{0,7}", "[a-z0-9]{0,8}"), 0..6),
        replicas in 0i64..1000,
    ) {
        let mut text = format!(
            "apiVersion: apps/v1\nkind: Deployment\nreplicas: {replicas}\nmetadata:\n  name: {name}\n  labels:\n"
        );
        for (k, v) in &labels {
            text.push_str(&format!("    {k}: '{v}'\n"));
        }
        if labels.is_empty() {
            text.push_str("    {}\n");
        }
        let doc: Value = match serde_yaml::from_str(&text) {
            Ok(doc) => doc,
            // Generated duplicate label keys are rejected by the YAML parser.
            Err(_) => return Ok(()),
        };
        let reg = registry();
        let builder = Builder::new(&reg);
        let first = builder.decode(&doc).unwrap();
        let second = builder.decode(&doc).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_list_cast_preserves_order(items in proptest::collection::vec("[a-zA-Z0-9]{1,10}", 0..20)) {
        let raw = Value::Sequence(items.iter().cloned().map(Value::String).collect());
        let reg = registry();
        let cast = Builder::new(&reg).cast_str(&raw, "list[str]").unwrap();
        let out: Vec<String> = cast
            .as_list()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        prop_assert_eq!(out, items);
    }
}
