//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod map;
mod validate;

pub use completions::handle_completions;
pub use map::handle_map;
pub use validate::handle_validate;

use crate::config::Config;
use crate::error::Result;
use crate::loader;
use crate::logging::timing::Timer;
use std::path::{Path, PathBuf};
use styx_core::{FunctionRegistry, TypeRegistry};

/// Definition directory and manifest a command works with
#[derive(Debug, Clone, PartialEq)]
pub struct Sources {
    pub definitions: PathBuf,
    pub manifest: PathBuf,
}

impl Sources {
    /// Command-line paths win over the `[paths]` config table
    pub fn resolve(definitions: Option<&Path>, manifest: Option<&Path>, config: &Config) -> Self {
        Self {
            definitions: definitions
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.paths.definitions_dir.clone()),
            manifest: manifest
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.paths.functions_manifest.clone()),
        }
    }

    /// Load every definition and build the registry over the built-in functions
    pub fn build_registry(&self) -> Result<TypeRegistry> {
        let _timer = Timer::with_details("build_registry", &self.definitions.display().to_string());
        loader::load_registry(
            &self.definitions,
            &self.manifest,
            FunctionRegistry::with_built_ins(),
        )
    }
}
