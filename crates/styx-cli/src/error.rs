//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from styx-core library
    #[error("{0}")]
    Core(#[from] styx_core::Error),

    /// A definition file that failed to parse
    #[error("{}: {source}", path.display())]
    Definition {
        path: PathBuf,
        #[source]
        source: styx_core::Error,
    },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A file could not be decoded in the format its extension implies
    #[error("Invalid file format for {}: expected {}: {}", path.display(), expected, message)]
    InvalidFormat {
        path: PathBuf,
        expected: String,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The core error behind this one, if any
    pub fn core(&self) -> Option<&styx_core::Error> {
        match self {
            Self::Core(core) | Self::Definition { source: core, .. } => Some(core),
            _ => None,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(core) | Self::Definition { source: core, .. } => match core {
                styx_core::Error::Schema { .. } => 2,
                styx_core::Error::FunctionManifest { .. } => 3,
                styx_core::Error::UnknownType { .. } => 4,
                styx_core::Error::ResolutionAmbiguity { .. }
                | styx_core::Error::Transform { .. }
                | styx_core::Error::RecursionLimit { .. } => 5,
                styx_core::Error::Json { .. } => 12,
            },
            Self::FileNotFound { .. } => 6,
            Self::InvalidFormat { .. } => 7,
            Self::Config(_) => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
            Self::Other { .. } => 99,
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let label = match error.core() {
        Some(styx_core::Error::Schema { .. }) => "Invalid definition:",
        Some(styx_core::Error::FunctionManifest { .. }) => "Invalid function manifest:",
        Some(_) => "Mapping failed:",
        None => "Error:",
    };

    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", label.red().bold(), error)
    } else {
        format!("{} {}", label, error)
    };

    // Surface the cause a user function reported.
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(&format!("\n  caused by: {}", text));
        }
        source = cause.source();
    }

    message
}
