//! Validation command handler

use super::Sources;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, TypeSummary};
use styx_core::TypeRegistry;
use tracing::{info, instrument};

/// Handle the validate command
#[instrument(skip_all, fields(definitions = ?args.definitions))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::new("validate_command");
    let sources = Sources::resolve(args.definitions.as_deref(), args.manifest.as_deref(), config);
    output.info(&format!("Validating definitions in {}", sources.definitions.display()))?;

    let registry = sources.build_registry()?;
    let summaries = summarize(&registry);
    info!(types = summaries.len(), "Definitions are valid");

    if summaries.is_empty() {
        output.warning(&format!("No definitions found in {}", sources.definitions.display()))?;
    } else {
        output.success(&format!(
            "✓ {} type(s) registered from {}",
            summaries.len(),
            sources.definitions.display()
        ))?;
        output.section("Registered types")?;
    }
    output.type_summaries(&summaries)?;

    timer.finish();
    Ok(())
}

/// One summary per registered type, in type-name order
pub fn summarize(registry: &TypeRegistry) -> Vec<TypeSummary> {
    registry
        .type_names()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .map(|mapper| {
            let definition = mapper.definition();
            let mut nested: Vec<String> = definition.nested_types().map(str::to_string).collect();
            nested.sort();
            nested.dedup();

            TypeSummary {
                name: definition.name.clone(),
                to_type: definition.to_type.clone(),
                many: definition.many,
                fields: definition.fields.len(),
                preprocess: definition.preprocess.len(),
                postprocess: definition.postprocess.len(),
                nested,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::Error;
    use crate::handlers::fixtures;
    use crate::output::SharedBuffer;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn args(dir: &std::path::Path) -> ValidateArgs {
        ValidateArgs {
            definitions: Some(dir.to_path_buf()),
            manifest: Some(dir.join("functions.styx")),
        }
    }

    #[test]
    fn test_validate_reports_types() {
        let dir = fixtures::maps_dir();
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(buffer.clone()));

        handle_validate(args(dir.path()), &Config::default(), &mut output).unwrap();

        let reported: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(reported[0]["name"], "Address");
        assert_eq!(reported[1]["name"], "Creature");
        assert_eq!(reported[1]["fields"], 3);
        assert_eq!(reported[1]["preprocess"], 1);
        assert_eq!(reported[1]["nested"], serde_json::json!(["Address"]));
    }

    #[test]
    fn test_validate_human_output() {
        let dir = fixtures::maps_dir();
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, false, Box::new(buffer.clone()));

        handle_validate(args(dir.path()), &Config::default(), &mut output).unwrap();

        let contents = buffer.contents();
        assert!(contents.contains("✓ 2 type(s) registered"));
        assert!(contents.contains("Creature │ Creature │ no"));
    }

    #[test]
    fn test_validate_empty_directory_warns() {
        let dir = tempfile::TempDir::new().unwrap();
        let buffer = SharedBuffer::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, false, Box::new(buffer.clone()));

        handle_validate(args(dir.path()), &Config::default(), &mut output).unwrap();
        assert!(buffer.contents().starts_with("WARNING: No definitions found"));
    }

    #[test]
    fn test_validate_rejects_unknown_function() {
        let dir = fixtures::maps_dir();
        fs::write(
            dir.path().join("ghost.json"),
            r#"{"type": "Ghost", "fields": {"wail": {"input_paths": ["a"], "function": "haunt"}}}"#,
        )
        .unwrap();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(SharedBuffer::default()));

        let err = handle_validate(args(dir.path()), &Config::default(), &mut output).unwrap_err();
        assert!(matches!(err, Error::Definition { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("unknown function: haunt"));
    }
}
