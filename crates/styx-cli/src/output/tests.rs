// Tests for output formatting
//
// Output is captured through a `SharedBuffer` handed to
// `OutputWriter::with_writer`.

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

fn creature_summary() -> TypeSummary {
    TypeSummary {
        name: "Creature".to_string(),
        to_type: "Creature".to_string(),
        many: false,
        fields: 3,
        preprocess: 1,
        postprocess: 0,
        nested: vec!["Address".to_string()],
    }
}

#[test]
fn test_format_machine_outputs() {
    let value = json!({"name": "Heracles"});
    assert_eq!(OutputFormat::Json.format(&value).unwrap(), r#"{"name":"Heracles"}"#);
    assert_eq!(OutputFormat::Yaml.format(&value).unwrap(), "name: Heracles\n");
    assert_eq!(
        OutputFormat::JsonPretty.format(&value).unwrap(),
        "{\n  \"name\": \"Heracles\"\n}"
    );
}

#[test]
fn test_data_ends_with_single_newline() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.data(&json!([1, 2])).unwrap();
    assert_eq!(buffer.contents(), "[1,2]\n");

    let (mut out, buffer) = writer(OutputFormat::Yaml, false);
    out.data(&json!({"a": 1})).unwrap();
    assert_eq!(buffer.contents(), "a: 1\n");
}

#[test]
fn test_messages_are_human_only() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.info("loading").unwrap();
    out.success("done").unwrap();
    out.section("Types").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.info("loading").unwrap();
    out.success("done").unwrap();
    assert_eq!(buffer.contents(), "INFO: loading\ndone\n");
}

#[test]
fn test_quiet_suppresses_messages_but_not_data() {
    let (mut out, buffer) = writer(OutputFormat::Human, true);
    out.info("loading").unwrap();
    out.data(&json!("x")).unwrap();
    assert_eq!(buffer.contents(), "\"x\"\n");
}

#[test]
fn test_table_alignment() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.table(
        &["TYPE", "FIELDS"],
        vec![
            vec!["Creature".to_string(), "3".to_string()],
            vec!["Cat".to_string(), "12".to_string()],
        ],
    )
    .unwrap();

    let lines: Vec<String> = buffer.contents().lines().map(String::from).collect();
    assert_eq!(lines[0], "TYPE     │ FIELDS");
    assert_eq!(lines[1], "─────────┼───────");
    assert_eq!(lines[2], "Creature │ 3");
    assert_eq!(lines[3], "Cat      │ 12");
}

#[test]
fn test_type_summaries_human_table() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.type_summaries(&[creature_summary()]).unwrap();

    let contents = buffer.contents();
    assert!(contents.starts_with("TYPE"));
    assert!(contents.contains("Creature │ Creature │ no"));
    assert!(contents.contains("Address"));
}

#[test]
fn test_type_summaries_json() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.type_summaries(&[creature_summary()]).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
    assert_eq!(parsed[0]["name"], "Creature");
    assert_eq!(parsed[0]["fields"], 3);
    assert_eq!(parsed[0]["nested"], json!(["Address"]));
}

#[test]
fn test_type_summaries_human_text() {
    let text = OutputFormat::Human
        .format_type_summaries(&[creature_summary()])
        .unwrap();
    assert_eq!(
        text,
        "Creature -> Creature: 3 field(s), 1 preprocess step(s), 0 postprocess step(s)\n"
    );
}
