//! Loading definitions and function manifests from disk
//!
//! Every supported file in the definitions directory holds one mapping
//! definition. Files are read in file-name order and decoded by extension
//! into raw JSON documents for the core parser.

use crate::config::FileFormat;
use crate::error::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use styx_core::{FunctionManifest, FunctionRegistry, TypeRegistry};
use tracing::{debug, info};

/// A raw definition document and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionFile {
    pub path: PathBuf,
    pub document: Value,
}

/// Reads mapping definitions from one directory
#[derive(Debug, Clone)]
pub struct DefinitionLoader {
    dir: PathBuf,
}

impl DefinitionLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Definition files in the directory, sorted by file name
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(Error::FileNotFound {
                path: self.dir.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && FileFormat::from_path(&path).is_some() {
                files.push(path);
            } else {
                debug!(path = %path.display(), "Skipping non-definition entry");
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(files)
    }

    /// Read and decode every definition file
    pub fn load(&self) -> Result<Vec<DefinitionFile>> {
        self.files()?
            .into_iter()
            .map(|path| {
                let document = read_document(&path)?;
                debug!(path = %path.display(), "Loaded definition document");
                Ok(DefinitionFile { path, document })
            })
            .collect()
    }
}

/// Decode one TOML/YAML/JSON file into a JSON value
pub fn read_document(path: &Path) -> Result<Value> {
    let format = FileFormat::from_path(path).ok_or_else(|| Error::InvalidFormat {
        path: path.to_path_buf(),
        expected: "TOML, YAML or JSON".to_string(),
        message: "unrecognized file extension".to_string(),
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(e),
    })?;

    format.parse(path, &content)
}

/// Read the function manifest, or declare the registered names when the file is absent
pub fn load_manifest(path: &Path, functions: &FunctionRegistry) -> Result<FunctionManifest> {
    if !path.exists() {
        info!(
            path = %path.display(),
            "No function manifest found, declaring the registered functions"
        );
        return Ok(FunctionManifest::from_registry(functions));
    }

    let document = read_document(path)?;
    Ok(FunctionManifest::from_value(&document)?)
}

/// Load definitions and manifest, then build a registry over `functions`
pub fn load_registry(
    definitions_dir: &Path,
    manifest_path: &Path,
    functions: FunctionRegistry,
) -> Result<TypeRegistry> {
    let manifest = load_manifest(manifest_path, &functions)?;
    let files = DefinitionLoader::new(definitions_dir).load()?;

    let mut builder = TypeRegistry::builder(functions).manifest(&manifest)?;
    for file in files {
        builder = builder
            .definition(&file.document)
            .map_err(|source| Error::Definition {
                path: file.path.clone(),
                source,
            })?;
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    const CREATURE: &str = r#"
type = "Creature"

[fields.name]
input_paths = ["fields.full_name"]

[fields.animal]
input_paths = ["fields.worlds_best_animal"]
function = "to_camel_case"
or_else = "black_cat"
"#;

    fn maps_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("creature.styx"), CREATURE).unwrap();
        fs::write(
            dir.path().join("address.json"),
            r#"{"type": "Address", "fields": {"city": {"input_paths": ["town"]}}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a definition").unwrap();
        dir
    }

    #[test]
    fn test_files_are_sorted_and_filtered() {
        let dir = maps_dir();
        let names: Vec<String> = DefinitionLoader::new(dir.path())
            .files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["address.json", "creature.styx"]);
    }

    #[test]
    fn test_toml_definition_becomes_json() {
        let dir = maps_dir();
        let files = DefinitionLoader::new(dir.path()).load().unwrap();
        assert_eq!(files[1].document["type"], json!("Creature"));
        assert_eq!(
            files[1].document["fields"]["animal"]["or_else"],
            json!("black_cat")
        );
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = DefinitionLoader::new(dir.path().join("maps")).load().unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_decode_error_names_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.yaml"), "type: [unclosed").unwrap();

        let err = DefinitionLoader::new(dir.path()).load().unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
        assert!(matches!(err, Error::InvalidFormat { ref expected, .. } if expected == "YAML"));
    }

    #[test]
    fn test_missing_manifest_declares_registered_functions() {
        let dir = TempDir::new().unwrap();
        let functions = FunctionRegistry::with_built_ins();
        let manifest = load_manifest(&dir.path().join("functions.styx"), &functions).unwrap();
        assert_eq!(manifest, FunctionManifest::from_registry(&functions));
    }

    #[test]
    fn test_manifest_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("functions.styx");
        fs::write(&path, "functions = [\"concat\", \"parse_json\"]\n").unwrap();

        let manifest = load_manifest(&path, &FunctionRegistry::with_built_ins()).unwrap();
        assert_eq!(manifest, FunctionManifest::new(["concat", "parse_json"]));
    }

    #[test]
    fn test_load_registry() {
        let dir = maps_dir();
        let registry = load_registry(
            dir.path(),
            &dir.path().join("functions.styx"),
            FunctionRegistry::with_built_ins(),
        )
        .unwrap();

        assert_eq!(registry.type_names(), vec!["Address", "Creature"]);
        let mapped = registry
            .map("Creature", &json!({"fields": {"full_name": "Heracles"}}))
            .unwrap();
        assert_eq!(mapped, json!({"animal": "blackCat", "name": "Heracles"}));
    }

    #[test]
    fn test_manifest_mismatch_fails_registry() {
        let dir = maps_dir();
        let config_dir = TempDir::new().unwrap();
        let manifest = config_dir.path().join("manifest.json");
        fs::write(&manifest, r#"{"functions": ["concat"]}"#).unwrap();

        let err = load_registry(dir.path(), &manifest, FunctionRegistry::with_built_ins()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_schema_error_names_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.json"), r#"{"type": "Empty", "fields": {}}"#).unwrap();

        let err = load_registry(
            dir.path(),
            &dir.path().join("functions.styx"),
            FunctionRegistry::with_built_ins(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Definition { ref path, .. } if path.ends_with("empty.json")));
    }
}
