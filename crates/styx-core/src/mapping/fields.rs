//! Field resolution
//!
//! Builds the target object of one mapping call from the (preprocessed)
//! source, one field at a time:
//!
//! 1. resolve the candidate values, directly or through a path condition
//! 2. combine them with the field's function, or take the single candidate
//! 3. apply the field's `on_throw` policy to any failure so far
//! 4. delegate to the nested type's mapper, if one is declared
//! 5. remap the value through the field's `value_map`
//!
//! Ambiguous conditional paths are always fatal. The policy never sees them,
//! and neither does a nested mapping that exceeds the depth limit.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use crate::definition::{FieldDefinition, FieldSource, PathCondition, TYPE_TAG};
use crate::error::MatchCount;
use crate::path::InputSource;
use crate::{Error, Result};
use serde_json::{Map, Value};

use super::policy::Outcome;
use super::registry::{Mapper, TypeRegistry};

/// Resolves every field of one mapper against a source object
pub struct FieldsMapper<'r> {
    registry: &'r TypeRegistry,
    mapper: &'r Mapper,
    /// Nested-type delegations above this one
    depth: usize,
}

impl<'r> FieldsMapper<'r> {
    pub(crate) fn new(registry: &'r TypeRegistry, mapper: &'r Mapper, depth: usize) -> Self {
        Self {
            registry,
            mapper,
            depth,
        }
    }

    /// Build the target object for `source`
    pub fn map(&self, source: &Value) -> Result<Value> {
        let definition = self.mapper.definition();
        let mut target = Value::Object(Map::new());

        if definition.include_type {
            if let Value::Object(map) = &mut target {
                map.insert(TYPE_TAG.to_string(), Value::String(definition.to_type.clone()));
            }
        }

        for field in &definition.fields {
            match self.map_field(field, source)? {
                Some(value) => self.write_field(field, &mut target, value)?,
                None => tracing::debug!(type_name = %definition.name, field = %field.name, "Field skipped"),
            }
        }

        Ok(target)
    }

    /// Write a resolved field, applying its policy if the target path rejects the write
    fn write_field(&self, field: &FieldDefinition, target: &mut Value, value: Value) -> Result<()> {
        let Err(err) = field.target.set(target, value) else {
            return Ok(());
        };

        let location = format!("{}.fields.{}", self.mapper.definition().name, field.name);
        let failed = Err(Error::write_failed(location.as_str(), err));
        match field.on_throw.apply(failed, field.or_else.as_ref(), &location)? {
            Outcome::Value(fallback) => field
                .target
                .set(target, fallback)
                .map_err(|e| Error::write_failed(location.as_str(), e)),
            Outcome::Skip => Ok(()),
        }
    }

    /// Resolve one field; `None` means the field is left out of the target
    fn map_field(&self, field: &FieldDefinition, source: &Value) -> Result<Option<Value>> {
        let location = format!("{}.fields.{}", self.mapper.definition().name, field.name);
        tracing::debug!(location = %location, "Resolving field");

        let result = match &field.source {
            FieldSource::Direct(paths) => {
                let candidates = paths
                    .iter()
                    .map(|path| path.resolve(source, field.or_else.as_ref()))
                    .collect();
                combine(field, paths, candidates, &location)
            }
            FieldSource::Conditional { paths, condition } => {
                let candidate = select(field, paths, condition, source)?;
                combine(field, paths, vec![candidate], &location)
            }
        };

        let value = match field.on_throw.apply(result, field.or_else.as_ref(), &location)? {
            Outcome::Value(value) => value,
            Outcome::Skip => return Ok(None),
        };

        let value = match &field.nested_type {
            Some(type_name) => self.delegate(field, type_name, value, source, &location)?,
            None => value,
        };

        let value = match &field.value_map {
            Some(value_map) => match value_map.lookup(&value) {
                Some(mapped) => mapped.clone(),
                None => value,
            },
            None => value,
        };

        Ok(Some(value))
    }

    /// Map `value` with the nested type's mapper, after lifting the copy-fields into it
    fn delegate(
        &self,
        field: &FieldDefinition,
        type_name: &str,
        value: Value,
        source: &Value,
        location: &str,
    ) -> Result<Value> {
        let mut nested = value;

        if !field.copy_fields.is_empty() {
            if nested.is_null() {
                nested = Value::Object(Map::new());
            }
            let Value::Object(map) = &mut nested else {
                return Err(Error::transform(
                    location,
                    format!("cannot copy values into a non-mapping value for nested type {}", type_name),
                ));
            };
            for copy in &field.copy_fields {
                map.insert(copy.key.clone(), copy.source.resolve(source, None));
            }
        }

        let id = self
            .mapper
            .link(type_name)
            .ok_or_else(|| Error::UnknownType {
                name: type_name.to_string(),
            })?;

        tracing::debug!(location = %location, nested_type = type_name, "Delegating to nested type");
        self.registry.mapper(id).map_nested(&nested, self.depth + 1)
    }
}

/// Pick the single candidate that satisfies the path condition
fn select(
    field: &FieldDefinition,
    paths: &[InputSource],
    condition: &PathCondition,
    source: &Value,
) -> Result<Value> {
    let mut matches: Vec<Value> = paths
        .iter()
        .map(|path| path.resolve(source, None))
        .filter(|candidate| condition.matches(candidate))
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(Error::ResolutionAmbiguity {
            field: field.name.clone(),
            matches: MatchCount::None,
        }),
        n => Err(Error::ResolutionAmbiguity {
            field: field.name.clone(),
            matches: MatchCount::Many(n),
        }),
    }
}

fn combine(field: &FieldDefinition, paths: &[InputSource], mut candidates: Vec<Value>, location: &str) -> Result<Value> {
    if let Some(function) = &field.function {
        return function
            .call(&candidates)
            .map_err(|e| Error::function_failed(location, function.name(), e));
    }

    match candidates.pop() {
        Some(value) if candidates.is_empty() && !value.is_null() => Ok(value),
        _ => {
            let described: Vec<String> = paths.iter().map(ToString::to_string).collect();
            Err(Error::transform(
                location,
                format!("no value found at [{}]", described.join(", ")),
            ))
        }
    }
}
