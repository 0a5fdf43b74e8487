//! Typed intermediate representation of mapping definitions
//!
//! Values of these types only come out of the definition parser, which
//! guarantees the structural invariants: a field has either direct or
//! conditional paths, a conditional field has a condition, several direct
//! paths come with a combining function, and an `or_else` policy comes with
//! an `or_else` value.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use crate::functions::FunctionRef;
use crate::path::{InputSource, OutputTarget, ValuePath};
use serde_json::{Map, Value};
use std::fmt;

/// Key under which a mapped object records its target type
pub const TYPE_TAG: &str = "_type";

/// Behavior when a step or field fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnThrow {
    /// Leave the object unchanged (steps) or omit the field (fields)
    Skip,
    /// Substitute the declared `or_else` value
    OrElse,
    /// Abort the mapping call
    #[default]
    Throw,
}

impl OnThrow {
    /// Parse the spelling used in definitions
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "skip" => Some(Self::Skip),
            "or_else" => Some(Self::OrElse),
            "throw" => Some(Self::Throw),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::OrElse => "or_else",
            Self::Throw => "throw",
        }
    }
}

impl fmt::Display for OnThrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source-type to target-type mapping
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    /// Registry key
    pub name: String,
    pub from_type: Option<String>,
    pub to_type: String,
    /// Apply per element of a source sequence
    pub many: bool,
    /// Tag the output with `to_type` under [`TYPE_TAG`]
    pub include_type: bool,
    /// Sorted by step key
    pub preprocess: Vec<ProcessStep>,
    /// Sorted by field name
    pub fields: Vec<FieldDefinition>,
    /// Sorted by step key
    pub postprocess: Vec<ProcessStep>,
}

impl TypeDefinition {
    /// Names of the types this definition delegates to
    pub fn nested_types(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| f.nested_type.as_deref())
    }
}

/// A single pre- or postprocessing step
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStep {
    pub key: String,
    pub inputs: Vec<InputSource>,
    pub output: OutputTarget,
    pub function: FunctionRef,
    pub or_else: Option<Value>,
    pub on_throw: OnThrow,
    /// Apply to each element of a sequence working object
    pub many: bool,
}

/// Resolution rule for one target field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    /// Where the value is written in the target
    pub target: ValuePath,
    pub source: FieldSource,
    pub function: Option<FunctionRef>,
    pub nested_type: Option<String>,
    /// Values lifted from the source into the nested object
    pub copy_fields: Vec<CopyField>,
    pub value_map: Option<ValueMap>,
    pub or_else: Option<Value>,
    pub on_throw: OnThrow,
}

/// How a field's candidate values are found
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// Every path is resolved and passed on
    Direct(Vec<InputSource>),
    /// Exactly one of the paths must satisfy the condition
    Conditional {
        paths: Vec<InputSource>,
        condition: PathCondition,
    },
}

/// Predicate selecting among conditional candidates
#[derive(Debug, Clone, PartialEq)]
pub struct PathCondition {
    pub field: ValuePath,
    pub value: Value,
}

impl PathCondition {
    pub fn matches(&self, candidate: &Value) -> bool {
        self.field.lookup(candidate).unwrap_or(&Value::Null) == &self.value
    }
}

/// A value copied into a nested object under `key`
#[derive(Debug, Clone, PartialEq)]
pub struct CopyField {
    pub key: String,
    pub source: InputSource,
}

/// Lookup table replacing a field's final value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap {
    pub entries: Map<String, Value>,
    pub default: Option<Value>,
}

impl ValueMap {
    /// Table key holding the fallback value
    pub const DEFAULT_KEY: &'static str = "_default";

    /// Strings are looked up verbatim, other values by their JSON text
    pub fn lookup(&self, value: &Value) -> Option<&Value> {
        let key = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.entries.get(&key).or(self.default.as_ref())
    }
}
