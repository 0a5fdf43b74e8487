//! Definition parser
//!
//! Turns a raw definition document into a [`TypeDefinition`]. Every shape
//! check happens here, so the runtime works on the typed IR without
//! presence checks of its own.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use crate::functions::{FunctionRef, FunctionRegistry};
use crate::path::{InputSource, OutputTarget, ValuePath};
use crate::{Error, Result};
use serde_json::{Map, Value};

use super::types::{
    CopyField, FieldDefinition, FieldSource, OnThrow, PathCondition, ProcessStep, TypeDefinition,
    ValueMap,
};

const UNNAMED: &str = "<unnamed>";

const TOP_LEVEL_KEYS: &[&str] = &[
    "type",
    "from_type",
    "to_type",
    "description",
    "many",
    "include_type",
    "fields",
    "preprocess",
    "postprocess",
];

const STEP_KEYS: &[&str] = &["input_paths", "output_path", "function", "or_else", "on_throw", "many"];

/// Keys with a meaning on a field definition. Any other key must be the
/// field's own name and carries copy-fields for a nested type.
const FIELD_RESERVED_WORDS: &[&str] = &[
    "input_paths",
    "possible_paths",
    "path_condition",
    "type",
    "function",
    "or_else",
    "on_throw",
    "value_map",
];

/// Parse a raw definition document against a function registry
pub fn parse(raw: &Value, functions: &FunctionRegistry) -> Result<TypeDefinition> {
    DefinitionParser::new(functions).parse(raw)
}

/// Validating parser from raw documents to [`TypeDefinition`]s
pub struct DefinitionParser<'a> {
    functions: &'a FunctionRegistry,
}

impl<'a> DefinitionParser<'a> {
    pub fn new(functions: &'a FunctionRegistry) -> Self {
        Self { functions }
    }

    /// Parse one type definition
    pub fn parse(&self, raw: &Value) -> Result<TypeDefinition> {
        let doc = raw
            .as_object()
            .ok_or_else(|| Error::schema(UNNAMED, "$", "A definition must be a mapping."))?;

        let name = self.parse_name(doc)?;
        let ctx = Ctx { type_name: &name };

        if let Some(key) = doc.keys().find(|k| !TOP_LEVEL_KEYS.contains(&k.as_str())) {
            return Err(ctx.error(key, format!("Unknown top-level key: {}", key)));
        }

        let to_type = match doc.get("to_type") {
            Some(v) => ctx.string(v, "to_type")?,
            None => name.clone(),
        };
        let from_type = doc.get("from_type").map(|v| ctx.string(v, "from_type")).transpose()?;
        let many = ctx.flag(doc, "many", "many")?;
        let include_type = ctx.flag(doc, "include_type", "include_type")?;

        let preprocess = match doc.get("preprocess") {
            Some(v) => self.parse_steps(&ctx, v, "preprocess")?,
            None => Vec::new(),
        };

        let fields = match doc.get("fields") {
            Some(v) => self.parse_fields(&ctx, v)?,
            None => {
                return Err(ctx.error(
                    "fields",
                    "'fields' is a required field for a mapping definition.",
                ))
            }
        };

        let postprocess = match doc.get("postprocess") {
            Some(v) => self.parse_steps(&ctx, v, "postprocess")?,
            None => Vec::new(),
        };

        tracing::debug!(
            type_name = %name,
            fields = fields.len(),
            preprocess = preprocess.len(),
            postprocess = postprocess.len(),
            "Parsed type definition"
        );

        Ok(TypeDefinition {
            name,
            from_type,
            to_type,
            many,
            include_type,
            preprocess,
            fields,
            postprocess,
        })
    }

    fn parse_name(&self, doc: &Map<String, Value>) -> Result<String> {
        let ctx = Ctx { type_name: UNNAMED };
        match (doc.get("type"), doc.get("to_type")) {
            (Some(v), _) => ctx.non_empty_string(v, "type"),
            (None, Some(v)) => ctx.non_empty_string(v, "to_type"),
            (None, None) => Err(ctx.error("type", "'type' must be declared at the top-level.")),
        }
    }

    fn parse_steps(&self, ctx: &Ctx<'_>, raw: &Value, section: &str) -> Result<Vec<ProcessStep>> {
        let steps = raw
            .as_object()
            .ok_or_else(|| ctx.error(section, format!("'{}' must be a mapping of step names to steps.", section)))?;

        let mut parsed = steps
            .iter()
            .map(|(key, step)| self.parse_step(ctx, &format!("{}.{}", section, key), key, step))
            .collect::<Result<Vec<_>>>()?;

        // Plain string order: "10_x" runs before "2_y".
        parsed.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(parsed)
    }

    fn parse_step(&self, ctx: &Ctx<'_>, location: &str, key: &str, raw: &Value) -> Result<ProcessStep> {
        let step = raw
            .as_object()
            .ok_or_else(|| ctx.error(location, "A process step must be a mapping."))?;

        if let Some(unknown) = step.keys().find(|k| !STEP_KEYS.contains(&k.as_str())) {
            return Err(ctx.error(location, format!("Unknown key on process step: {}", unknown)));
        }

        let input_paths = step
            .get("input_paths")
            .ok_or_else(|| ctx.error(location, "'input_paths' is required on a process step."))?;
        let inputs = ctx.input_sources(input_paths, &format!("{}.input_paths", location), "input_paths")?;

        let output_location = format!("{}.output_path", location);
        let output = match step.get("output_path") {
            Some(Value::String(raw)) => OutputTarget::parse(raw).map_err(|e| ctx.error(&output_location, e.to_string()))?,
            Some(_) => return Err(ctx.error(&output_location, "output_path must be a string.")),
            None => return Err(ctx.error(&output_location, "'output_path' is required on a process step.")),
        };

        let function_location = format!("{}.function", location);
        let function = match step.get("function") {
            Some(v) => self.resolve_function(ctx, v, &function_location)?,
            None => return Err(ctx.error(&function_location, "'function' is required on a process step.")),
        };

        let or_else = parse_or_else(step);
        let on_throw = ctx.on_throw(step, or_else.as_ref(), location)?;
        let many = ctx.flag(step, "many", &format!("{}.many", location))?;

        Ok(ProcessStep {
            key: key.to_string(),
            inputs,
            output,
            function,
            or_else,
            on_throw,
            many,
        })
    }

    fn parse_fields(&self, ctx: &Ctx<'_>, raw: &Value) -> Result<Vec<FieldDefinition>> {
        let fields = raw
            .as_object()
            .ok_or_else(|| ctx.error("fields", "'fields' must be a mapping of field names to fields."))?;

        if fields.is_empty() {
            return Err(ctx.error("fields", "'fields' cannot be empty (what are we mapping?)"));
        }

        let mut parsed = fields
            .iter()
            .map(|(name, field)| self.parse_field(ctx, name, field))
            .collect::<Result<Vec<_>>>()?;
        parsed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parsed)
    }

    fn parse_field(&self, ctx: &Ctx<'_>, name: &str, raw: &Value) -> Result<FieldDefinition> {
        let location = format!("fields.{}", name);
        let field = raw
            .as_object()
            .ok_or_else(|| ctx.error(&location, "A field definition must be a mapping."))?;

        let target = ValuePath::parse(name).map_err(|e| ctx.error(&location, e.to_string()))?;

        let function = field
            .get("function")
            .map(|v| self.resolve_function(ctx, v, &format!("{}.function", location)))
            .transpose()?;

        let source = ctx.field_source(field, function.is_some(), &location)?;

        let or_else = parse_or_else(field);
        let on_throw = ctx.on_throw(field, or_else.as_ref(), &location)?;

        let nested_type = field
            .get("type")
            .map(|v| ctx.non_empty_string(v, &format!("{}.type", location)))
            .transpose()?;

        let value_map = field
            .get("value_map")
            .map(|v| ctx.value_map(v, &format!("{}.value_map", location)))
            .transpose()?;

        let copy_fields = ctx.copy_fields(name, field, nested_type.is_some(), &location)?;

        Ok(FieldDefinition {
            name: name.to_string(),
            target,
            source,
            function,
            nested_type,
            copy_fields,
            value_map,
            or_else,
            on_throw,
        })
    }

    fn resolve_function(&self, ctx: &Ctx<'_>, raw: &Value, location: &str) -> Result<FunctionRef> {
        let name = raw
            .as_str()
            .ok_or_else(|| ctx.error(location, "function must be a string."))?;
        self.functions
            .get(name)
            .ok_or_else(|| ctx.error(location, format!("unknown function: {}", name)))
    }
}

fn parse_or_else(obj: &Map<String, Value>) -> Option<Value> {
    obj.get("or_else").filter(|v| !v.is_null()).cloned()
}

/// Error-building helpers scoped to one type definition
struct Ctx<'a> {
    type_name: &'a str,
}

impl Ctx<'_> {
    fn error(&self, location: &str, message: impl Into<String>) -> Error {
        Error::schema(self.type_name, location, message)
    }

    fn string(&self, raw: &Value, location: &str) -> Result<String> {
        raw.as_str()
            .map(str::to_string)
            .ok_or_else(|| self.error(location, format!("'{}' must be a string.", location)))
    }

    fn non_empty_string(&self, raw: &Value, location: &str) -> Result<String> {
        let value = self.string(raw, location)?;
        if value.is_empty() {
            return Err(self.error(location, format!("'{}' cannot be empty.", location)));
        }
        Ok(value)
    }

    fn flag(&self, obj: &Map<String, Value>, key: &str, location: &str) -> Result<bool> {
        match obj.get(key) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(self.error(location, format!("'{}' must be a boolean.", key))),
        }
    }

    fn on_throw(&self, obj: &Map<String, Value>, or_else: Option<&Value>, location: &str) -> Result<OnThrow> {
        let location = format!("{}.on_throw", location);
        let Some(raw) = obj.get("on_throw") else {
            return Ok(OnThrow::default());
        };

        let raw = raw
            .as_str()
            .ok_or_else(|| self.error(&location, "'on_throw' must be a string."))?;
        let action = OnThrow::parse(raw)
            .ok_or_else(|| self.error(&location, format!("Unknown 'on_throw' action given: {}", raw)))?;

        if action == OnThrow::OrElse && or_else.is_none() {
            return Err(self.error(
                &location,
                "If 'on_throw' action is 'or_else', then 'or_else' must be defined.",
            ));
        }
        Ok(action)
    }

    fn input_sources(&self, raw: &Value, location: &str, key: &str) -> Result<Vec<InputSource>> {
        let items = raw
            .as_array()
            .filter(|items| items.iter().all(Value::is_string))
            .ok_or_else(|| self.error(location, format!("{} must be a list of strings.", key)))?;

        items
            .iter()
            .filter_map(Value::as_str)
            .map(|path| InputSource::parse(path).map_err(|e| self.error(location, e.to_string())))
            .collect()
    }

    fn field_source(&self, field: &Map<String, Value>, has_function: bool, location: &str) -> Result<FieldSource> {
        match (field.get("input_paths"), field.get("possible_paths")) {
            (None, None) => Err(self.error(
                location,
                "Either 'input_paths' or 'possible_paths' must be declared. Aborting.",
            )),
            (Some(_), Some(_)) => Err(self.error(
                location,
                "Either 'input_paths' or 'possible_paths' must be declared, but not both.",
            )),
            (Some(raw), None) => {
                let paths = self.input_sources(raw, &format!("{}.input_paths", location), "input_paths")?;
                if paths.len() != 1 && !has_function {
                    return Err(self.error(
                        &format!("{}.input_paths", location),
                        "'input_paths' must be of length 1 if 'function' is not defined",
                    ));
                }
                Ok(FieldSource::Direct(paths))
            }
            (None, Some(raw)) => {
                let possible_location = format!("{}.possible_paths", location);
                let paths = self.input_sources(raw, &possible_location, "possible_paths")?;
                if paths.is_empty() {
                    return Err(self.error(&possible_location, "'possible_paths' cannot be empty."));
                }
                let condition = match field.get("path_condition") {
                    Some(v) => self.path_condition(v, &format!("{}.path_condition", location))?,
                    None => {
                        return Err(self.error(
                            &possible_location,
                            "'path_condition' must be set if 'possible_paths' is set.",
                        ))
                    }
                };
                Ok(FieldSource::Conditional { paths, condition })
            }
        }
    }

    fn path_condition(&self, raw: &Value, location: &str) -> Result<PathCondition> {
        let shape_error = || self.error(location, "'path_condition' must be a mapping of {field, value}.");
        let condition = raw.as_object().ok_or_else(shape_error)?;

        let field = condition
            .get("field")
            .and_then(Value::as_str)
            .ok_or_else(shape_error)?;
        let value = condition.get("value").cloned().ok_or_else(shape_error)?;
        if condition.len() != 2 {
            return Err(shape_error());
        }

        let field = ValuePath::parse(field).map_err(|e| self.error(location, e.to_string()))?;
        Ok(PathCondition { field, value })
    }

    fn value_map(&self, raw: &Value, location: &str) -> Result<ValueMap> {
        let table = raw
            .as_object()
            .ok_or_else(|| self.error(location, "'value_map' must be a mapping."))?;

        let mut entries = table.clone();
        let default = entries.remove(ValueMap::DEFAULT_KEY);
        Ok(ValueMap { entries, default })
    }

    /// Non-reserved keys carry values copied into the nested object.
    ///
    /// The only allowed non-reserved key is the field's own name, and only on
    /// a field that declares a nested type.
    fn copy_fields(
        &self,
        field_name: &str,
        field: &Map<String, Value>,
        has_nested_type: bool,
        location: &str,
    ) -> Result<Vec<CopyField>> {
        let mut copy_fields = Vec::new();

        for (key, value) in field {
            if FIELD_RESERVED_WORDS.contains(&key.as_str()) {
                continue;
            }

            if key != field_name {
                return Err(self.error(
                    location,
                    format!("Unknown key '{}' found on field definition: {}", key, field_name),
                ));
            }

            if !has_nested_type {
                return Err(self.error(
                    location,
                    "Custom values cannot be set on a definition without declaring a nested object type",
                ));
            }

            let copy_location = format!("{}.{}", location, key);
            let entries = value
                .as_object()
                .ok_or_else(|| self.error(&copy_location, "Copied values must be a mapping."))?;

            for (nested_key, source) in entries {
                let source = match source {
                    Value::String(raw) => InputSource::parse(raw)
                        .map_err(|e| self.error(&format!("{}.{}", copy_location, nested_key), e.to_string()))?,
                    literal => InputSource::Literal(literal.clone()),
                };
                copy_fields.push(CopyField {
                    key: nested_key.clone(),
                    source,
                });
            }
        }

        Ok(copy_fields)
    }
}
