//! Path resolution over nested JSON values
//!
//! Paths are `.`-delimited segments. A segment indexes into a mapping by key,
//! or into a sequence when it parses as an index. Two spellings are not
//! lookups at all: `.` on its own stands for the whole object, and
//! `const('X')` stands for the literal string `X`.
//!
//! Definitions are parsed once into [`ValuePath`], [`InputSource`] and
//! [`OutputTarget`] values so the runtime never re-parses path strings.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Sentinel path meaning "the whole object"
pub const WHOLE_OBJECT: &str = ".";

const LITERAL_PREFIX: &str = "const('";
const LITERAL_SUFFIX: &str = "')";

/// Errors raised while parsing a path string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path cannot be empty")]
    Empty,

    #[error("path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("path '{path}' writes index {index} into a sequence of length {len}")]
    IndexOutOfRange { path: String, index: usize, len: usize },
}

/// A parsed, non-empty `.`-delimited path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValuePath {
    raw: String,
    segments: Vec<String>,
}

impl ValuePath {
    /// Parse a delimited path such as `fields.address.0.city`
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::EmptySegment { path: raw.to_string() });
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written in the definition
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Borrow the value at this path.
    ///
    /// Returns `None` as soon as a segment is missing or the value reached
    /// (intermediate or final) is null.
    pub fn lookup<'v>(&self, obj: &'v Value) -> Option<&'v Value> {
        let mut current = obj;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
            if current.is_null() {
                return None;
            }
        }
        Some(current)
    }

    /// Clone the value at this path, or `default` (null when absent) on a miss
    pub fn get(&self, obj: &Value, default: Option<&Value>) -> Value {
        self.lookup(obj)
            .or(default)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write `value` at this path, creating intermediate mappings as needed.
    ///
    /// Intermediate scalars and nulls are replaced by fresh mappings. An index
    /// segment on a sequence writes in place, or appends when it equals the
    /// length. Any larger index fails and leaves `obj` untouched.
    pub fn set(&self, obj: &mut Value, value: Value) -> Result<(), PathError> {
        write_at(obj, &self.raw, &self.segments, value)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// Sequences are never created here, only reached through existing values,
// so an out-of-range index is detected before anything has been modified.
fn write_at(current: &mut Value, path: &str, segments: &[String], value: Value) -> Result<(), PathError> {
    let Some((head, rest)) = segments.split_first() else {
        *current = value;
        return Ok(());
    };

    if let Value::Array(items) = current {
        if let Ok(index) = head.parse::<usize>() {
            let len = items.len();
            if index > len {
                return Err(PathError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                    len,
                });
            }
            if index == len {
                items.push(Value::Null);
            }
            return write_at(&mut items[index], path, rest, value);
        }
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            let slot = map.entry(head.clone()).or_insert(Value::Null);
            write_at(slot, path, rest, value)
        }
        _ => Ok(()),
    }
}

/// Where an argument value comes from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    /// `.`: the whole object
    WholeObject,
    /// `const('X')`, or a non-string value written directly in a definition
    Literal(Value),
    /// A lookup path
    Path(ValuePath),
}

impl InputSource {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw == WHOLE_OBJECT {
            return Ok(Self::WholeObject);
        }
        if let Some(literal) = parse_literal(raw) {
            return Ok(Self::Literal(Value::String(literal.to_string())));
        }
        ValuePath::parse(raw).map(Self::Path)
    }

    /// Resolve against `obj`; a path miss yields `default`, or null without one
    pub fn resolve(&self, obj: &Value, default: Option<&Value>) -> Value {
        match self {
            Self::WholeObject => obj.clone(),
            Self::Literal(value) => value.clone(),
            Self::Path(path) => path.get(obj, default),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeObject => f.write_str(WHOLE_OBJECT),
            Self::Literal(Value::String(s)) => write!(f, "{}{}{}", LITERAL_PREFIX, s, LITERAL_SUFFIX),
            Self::Literal(value) => write!(f, "{}", value),
            Self::Path(path) => write!(f, "{}", path),
        }
    }
}

/// Where a step writes its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// `.`: replace the whole object
    WholeObject,
    Path(ValuePath),
}

impl OutputTarget {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw == WHOLE_OBJECT {
            Ok(Self::WholeObject)
        } else {
            ValuePath::parse(raw).map(Self::Path)
        }
    }

    pub fn write(&self, obj: &mut Value, value: Value) -> Result<(), PathError> {
        match self {
            Self::WholeObject => {
                *obj = value;
                Ok(())
            }
            Self::Path(path) => path.set(obj, value),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WholeObject => f.write_str(WHOLE_OBJECT),
            Self::Path(path) => write!(f, "{}", path),
        }
    }
}

/// Recognize the `const('X')` literal form, returning `X`
pub fn parse_literal(raw: &str) -> Option<&str> {
    if raw.len() >= LITERAL_PREFIX.len() + LITERAL_SUFFIX.len() {
        raw.strip_prefix(LITERAL_PREFIX)?.strip_suffix(LITERAL_SUFFIX)
    } else {
        None
    }
}

/// Read the value at `path` (a path, `.` or a literal), falling back to `default`.
///
/// A malformed path is treated as a miss.
pub fn get(obj: &Value, path: &str, default: Value) -> Value {
    match InputSource::parse(path) {
        Ok(source) => source.resolve(obj, Some(&default)),
        Err(_) => default,
    }
}

/// Write `value` at `path` (a path or `.`)
pub fn set(obj: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    OutputTarget::parse(path)?.write(obj, value)
}
