//! Integration tests for building registries and mapping objects


use pretty_assertions::assert_eq;
use serde_json::json;
use styx_core::{Error, FunctionManifest, TypeRegistry, TYPE_TAG};
use test_support::*;

#[test]
fn test_preprocess_concat() {
    let registry = registry(&[heracles_definition()]);
    let out = registry.map("Creature", &heracles_source()).unwrap();
    assert_eq!(out["full_name"], json!("Heracles"));
}

#[test]
fn test_step_or_else_writes_default() {
    let registry = registry(&[best_animal_definition("or_else")]);
    let out = registry.map("Creature", &json!({"fields": {}})).unwrap();
    assert_eq!(out, json!({"best_animal": "cat"}));
}

#[test]
fn test_step_skip_leaves_source_as_is() {
    let registry = registry(&[best_animal_definition("skip")]);
    let out = registry.map("Creature", &json!({"fields": {}})).unwrap();
    assert_eq!(out, json!({}));

    let out = registry
        .map("Creature", &json!({"fields": {"worlds_best_animal": "dog"}}))
        .unwrap();
    assert_eq!(out, json!({"best_animal": "dog"}));
}

#[test]
fn test_step_throw_fails_call() {
    let registry = registry(&[best_animal_definition("throw")]);
    let err = assert_map_fails(&registry, "Creature", &json!({"fields": {}}));
    assert!(matches!(err, Error::Transform { .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_step_ordering_is_lexicographic() {
    let registry = registry(&[json!({
        "type": "Creature",
        "preprocess": {
            "02_y": {"input_paths": ["x"], "output_path": "y", "function": "upper"},
            "01_x": {"input_paths": ["name", "const('!')"], "output_path": "x", "function": "concat"}
        },
        "fields": {"shout": {"input_paths": ["y"]}}
    })]);
    let out = registry.map("Creature", &json!({"name": "hera"})).unwrap();
    assert_eq!(out, json!({"shout": "HERA!"}));
}

#[test]
fn test_conditional_paths() {
    let definition = json!({
        "type": "Creature",
        "fields": {
            "address": {
                "possible_paths": ["addresses.0", "addresses.1"],
                "path_condition": {"field": "kind", "value": "A"},
                "on_throw": "skip"
            }
        }
    });
    let registry = registry(&[definition]);

    let source = json!({"addresses": [{"kind": "B", "city": "Thebes"}, {"kind": "A", "city": "Argos"}]});
    let out = registry.map("Creature", &source).unwrap();
    assert_eq!(out, json!({"address": {"kind": "A", "city": "Argos"}}));

    let none = json!({"addresses": [{"kind": "B"}, {"kind": "C"}]});
    assert!(matches!(
        assert_map_fails(&registry, "Creature", &none),
        Error::ResolutionAmbiguity { .. }
    ));

    let two = json!({"addresses": [{"kind": "A"}, {"kind": "A"}]});
    assert!(matches!(
        assert_map_fails(&registry, "Creature", &two),
        Error::ResolutionAmbiguity { .. }
    ));
}

#[test]
fn test_recursive_types_build_and_terminate() {
    let registry = registry(&recursive_definitions());
    assert_eq!(registry.type_names(), vec!["Address", "Person"]);

    let source = json!({
        "name": "Alcmene",
        "home": {
            "city": "Thebes",
            "resident": {"name": "Heracles", "home": {"city": "Tiryns"}}
        }
    });
    let out = registry.map("Person", &source).unwrap();
    assert_eq!(
        out,
        json!({
            "name": "Alcmene",
            "home": {
                "city": "Thebes",
                "resident_name": "Alcmene",
                "resident": {
                    "name": "Heracles",
                    "home": {"city": "Tiryns", "resident_name": "Heracles"}
                }
            }
        })
    );
}

#[test]
fn test_idempotent_and_source_untouched() {
    let registry = registry(&[heracles_definition()]);
    let source = heracles_source();
    let first = registry.map("Creature", &source).unwrap();
    let second = registry.map("Creature", &source).unwrap();
    assert_eq!(first, second);
    assert_eq!(source, heracles_source());
}

#[test]
fn test_type_tag_and_many() {
    let registry = registry(&[json!({
        "type": "Labour",
        "to_type": "Task",
        "many": true,
        "include_type": true,
        "fields": {"title": {"input_paths": ["name"], "function": "upper"}}
    })]);
    let out = registry
        .map("Labour", &json!([{"name": "lion"}, {"name": "hydra"}]))
        .unwrap();
    assert_eq!(
        out,
        json!([
            {TYPE_TAG: "Task", "title": "LION"},
            {TYPE_TAG: "Task", "title": "HYDRA"}
        ])
    );
}

#[test]
fn test_manifest_mismatch_blocks_build() {
    let err = TypeRegistry::builder(functions())
        .manifest(&FunctionManifest::new(["concat", "parse_json", "ghost"]))
        .unwrap_err();
    assert!(err.to_string().contains("Function names were: ghost"));
}

#[test]
fn test_unknown_top_level_type() {
    let registry = registry(&[heracles_definition()]);
    let err = assert_map_fails(&registry, "Ghost", &json!({}));
    assert_eq!(err.to_string(), "Unknown type: Ghost");
}
