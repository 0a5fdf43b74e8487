//! Error types for the Styx core library
//!
//! This module defines the error taxonomy shared by the definition parser and
//! the mapping runtime, using thiserror for the error definitions and anyhow
//! for errors raised inside user-supplied functions.

use crate::path::PathError;
use std::fmt;
use thiserror::Error;

/// Main error type for Styx operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed mapping definition, raised while loading definitions
    #[error("Schema error in {type_name} at '{location}': {message}")]
    Schema {
        type_name: String,
        location: String,
        message: String,
    },

    /// Declared function manifest and registered functions disagree
    #[error("Function manifest error: {message}")]
    FunctionManifest {
        message: String,
        names: Vec<String>,
    },

    /// Conditional path selection did not yield exactly one candidate
    #[error("Unable to determine input path for field '{field}': {matches}")]
    ResolutionAmbiguity {
        field: String,
        matches: MatchCount,
    },

    /// A function failed or a required value was missing
    #[error("Transform failed at '{location}': {message}")]
    Transform {
        location: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Nested types delegated to each other past the depth limit
    #[error("Nesting depth limit of {limit} exceeded while mapping {type_name}")]
    RecursionLimit { type_name: String, limit: usize },

    /// Reference to a type that has no mapper in the registry
    #[error("Unknown type: {name}")]
    UnknownType { name: String },

    /// JSON conversion errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Number of candidates that satisfied a path condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchCount {
    /// No candidate satisfied the predicate
    None,
    /// More than one candidate satisfied the predicate
    Many(usize),
}

impl fmt::Display for MatchCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchCount::None => write!(f, "no option satisfies the path condition"),
            MatchCount::Many(n) => write!(f, "{} options satisfy the path condition", n),
        }
    }
}

impl Error {
    /// Create a schema error for a location inside a type definition
    pub fn schema(
        type_name: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Schema {
            type_name: type_name.into(),
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create a transform error without an underlying cause
    pub fn transform(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            location: location.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap the failure of a named function
    pub fn function_failed(location: impl Into<String>, function: &str, source: anyhow::Error) -> Self {
        Self::Transform {
            location: location.into(),
            message: format!("function '{}' failed: {}", function, source),
            source: Some(source),
        }
    }

    /// Wrap a result that could not be written at its output path
    pub fn write_failed(location: impl Into<String>, source: PathError) -> Self {
        Self::Transform {
            location: location.into(),
            message: source.to_string(),
            source: Some(source.into()),
        }
    }

    /// Whether an `on_throw` policy is allowed to absorb this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transform { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
