//! Property-based tests for path resolution and mapping
//!
//! These tests verify invariants that should hold for arbitrary sources
//! and definitions, not just the hand-written fixtures.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use styx_core::definition;
use styx_core::path::{self, ValuePath};
use styx_core::{build, FunctionRegistry};

// Strategy functions for property testing

/// Strategy for generating path segments that never parse as indices
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z_]{1,8}"
}

/// Strategy for generating `.`-delimited mapping paths
fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(segment_strategy(), 1..5).prop_map(|segments| segments.join("."))
}

/// Strategy for generating arbitrary JSON values
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

/// Strategy for generating definition-like documents, mostly malformed
fn raw_definition_strategy() -> impl Strategy<Value = Value> {
    let field = prop_oneof![
        json_strategy(),
        path_strategy().prop_map(|p| json!({"input_paths": [p]})),
        (path_strategy(), path_strategy()).prop_map(|(a, b)| json!({"input_paths": [a, b]})),
        path_strategy().prop_map(|p| json!({"possible_paths": [p], "path_condition": {"field": "kind"}})),
        path_strategy().prop_map(|p| json!({"input_paths": [p], "on_throw": "or_else"})),
        path_strategy().prop_map(|p| json!({"input_paths": [p], "function": "hades"})),
    ];
    (
        proptest::option::of("[A-Z][a-z]{0,8}"),
        prop::collection::btree_map(segment_strategy(), field, 0..4),
        json_strategy(),
    )
        .prop_map(|(name, fields, extra)| {
            let mut doc = Map::new();
            if let Some(name) = name {
                doc.insert("type".to_string(), json!(name));
            }
            doc.insert("fields".to_string(), Value::Object(fields.into_iter().collect()));
            if extra.is_object() {
                doc.insert("preprocess".to_string(), extra);
            }
            Value::Object(doc)
        })
}

proptest! {
    #[test]
    fn prop_set_then_get_round_trips(
        mut obj in json_strategy(),
        path in path_strategy(),
        value in json_strategy(),
    ) {
        prop_assume!(!value.is_null());
        path::set(&mut obj, &path, value.clone()).unwrap();
        prop_assert_eq!(path::get(&obj, &path, Value::Null), value);
    }

    #[test]
    fn prop_get_never_panics(obj in json_strategy(), raw in "[a-z0-9_.']{0,16}") {
        let _ = path::get(&obj, &raw, Value::Null);
    }

    #[test]
    fn prop_set_never_panics(mut obj in json_strategy(), raw in "[a-z0-9.]{0,24}", value in json_strategy()) {
        let before = obj.clone();
        if path::set(&mut obj, &raw, value).is_err() {
            prop_assert_eq!(obj, before);
        }
    }

    #[test]
    fn prop_parse_path_segments(path in path_strategy()) {
        let parsed = ValuePath::parse(&path).unwrap();
        prop_assert_eq!(parsed.segments().join("."), path);
    }

    #[test]
    fn prop_parser_never_panics(raw in raw_definition_strategy()) {
        let functions = FunctionRegistry::with_built_ins();
        let _ = definition::parse(&raw, &functions);
    }

    #[test]
    fn prop_parser_rejects_non_mappings(raw in json_strategy()) {
        prop_assume!(!raw.is_object());
        let functions = FunctionRegistry::with_built_ins();
        prop_assert!(definition::parse(&raw, &functions).is_err());
    }

    #[test]
    fn prop_mapping_is_idempotent(
        source in json_strategy(),
        paths in prop::collection::vec(path_strategy(), 1..4),
    ) {
        let fields: Map<String, Value> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (format!("field_{}", i), json!({"input_paths": [p], "on_throw": "skip"})))
            .collect();
        let registry = build(
            &[json!({"type": "Sample", "include_type": true, "fields": fields})],
            FunctionRegistry::with_built_ins(),
        )
        .unwrap();

        let before = source.clone();
        let first = registry.map("Sample", &source).unwrap();
        let second = registry.map("Sample", &source).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&source, &before);
        prop_assert_eq!(&first["_type"], &json!("Sample"));
    }
}
