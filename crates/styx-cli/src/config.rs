//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Command-line arguments, which take precedence

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where definitions and the manifest live
    pub paths: PathConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Path configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory holding the mapping definitions
    pub definitions_dir: PathBuf,

    /// Function manifest file
    pub functions_manifest: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (compact, full, json)
    pub format: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            definitions_dir: PathBuf::from("maps"),
            functions_manifest: PathBuf::from("functions.styx"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Serialization format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// `.toml`/`.styx` are TOML, `.yaml`/`.yml` YAML, `.json` JSON
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") | Some("styx") => Some(Self::Toml),
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Yaml => "YAML",
            Self::Json => "JSON",
        }
    }

    /// Decode `content` read from `path`
    pub fn parse<T: serde::de::DeserializeOwned>(&self, path: &Path, content: &str) -> Result<T> {
        let invalid = |message: String| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: self.name().to_string(),
            message,
        };

        match self {
            Self::Toml => toml::from_str(content).map_err(|e| invalid(e.to_string())),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| invalid(e.to_string())),
            Self::Json => serde_json::from_str(content).map_err(|e| invalid(e.to_string())),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let format = FileFormat::from_path(path).ok_or_else(|| {
            Error::config(format!(
                "Unsupported configuration file {}: expected .toml, .yaml, .yml or .json",
                path.display()
            ))
        })?;

        let content = std::fs::read_to_string(path)?;
        format.parse(path, &content)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        match Self::default_config_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".styx.toml"),
            PathBuf::from("styx.toml"),
            PathBuf::from(".styx.yaml"),
            PathBuf::from(".styx.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let styx_dir = config_dir.join("styx");
            paths.push(styx_dir.join("config.toml"));
            paths.push(styx_dir.join("config.yaml"));
            paths.push(styx_dir.join("config.json"));
        }

        paths
    }
}
