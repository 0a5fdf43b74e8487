//! Built-in functions for common operations
//!
//! These cover the usual string plumbing in definitions: joining values,
//! decoding embedded JSON, reading loose booleans and camel-casing keys.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use anyhow::{anyhow, bail, Result};
use serde_json::Value;
use std::sync::Arc;

use super::TransformFn;

/// Every built-in function with its registry name
pub fn all() -> Vec<(&'static str, TransformFn)> {
    vec![
        ("concat", Arc::new(concat) as TransformFn),
        ("to_camel_case", Arc::new(to_camel_case) as TransformFn),
        ("parse_json", Arc::new(parse_json) as TransformFn),
        ("parse_bool", Arc::new(parse_bool) as TransformFn),
    ]
}

/// Concatenate strings, or sequences, in argument order
pub fn concat(args: &[Value]) -> Result<Value> {
    if args.iter().all(Value::is_string) {
        let joined: String = args.iter().filter_map(Value::as_str).collect();
        return Ok(Value::String(joined));
    }

    if args.iter().all(Value::is_array) {
        let joined: Vec<Value> = args
            .iter()
            .filter_map(Value::as_array)
            .flat_map(|items| items.iter().cloned())
            .collect();
        return Ok(Value::Array(joined));
    }

    bail!("concat expects all strings or all sequences, got {}", describe(args))
}

/// `snake_case` to `snakeCase`
pub fn to_camel_case(args: &[Value]) -> Result<Value> {
    let input = single_str("to_camel_case", args)?;
    let mut components = input.split('_');
    let mut output = components.next().unwrap_or_default().to_string();
    for component in components {
        if component.is_empty() {
            output.push('_');
        } else {
            output.push_str(&capitalize(component));
        }
    }
    Ok(Value::String(output))
}

/// Decode a JSON document held in a string
pub fn parse_json(args: &[Value]) -> Result<Value> {
    let input = single_str("parse_json", args)?;
    serde_json::from_str(input).map_err(|e| anyhow!("parse_json: invalid JSON: {}", e))
}

/// Read a loose boolean: true, 1, t, y or yes (any case)
pub fn parse_bool(args: &[Value]) -> Result<Value> {
    if let [Value::Bool(b)] = args {
        return Ok(Value::Bool(*b));
    }
    let input = single_str("parse_bool", args)?;
    let truthy = matches!(input.to_lowercase().as_str(), "true" | "1" | "t" | "y" | "yes");
    Ok(Value::Bool(truthy))
}

fn single_str<'a>(function: &str, args: &'a [Value]) -> Result<&'a str> {
    match args {
        [Value::String(s)] => Ok(s.as_str()),
        [other] => bail!("{} expects a string, got {}", function, type_name(other)),
        _ => bail!("{} expects exactly one argument, got {}", function, args.len()),
    }
}

// First char upper, rest lower.
fn capitalize(component: &str) -> String {
    let mut chars = component.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn describe(args: &[Value]) -> String {
    let names: Vec<&str> = args.iter().map(type_name).collect();
    format!("[{}]", names.join(", "))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concat_strings() {
        assert_eq!(concat(&[json!("Hera"), json!("cles")]).unwrap(), json!("Heracles"));
        assert_eq!(concat(&[json!("a"), json!("b"), json!("c")]).unwrap(), json!("abc"));
    }

    #[test]
    fn test_concat_sequences() {
        assert_eq!(concat(&[json!([1]), json!([2, 3])]).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_concat_rejects_missing_values() {
        let err = concat(&[json!("Hera"), Value::Null]).unwrap_err();
        assert!(err.to_string().contains("[string, null]"));
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case(&[json!("first_name")]).unwrap(), json!("firstName"));
        assert_eq!(to_camel_case(&[json!("worlds_best_animal")]).unwrap(), json!("worldsBestAnimal"));
        assert_eq!(to_camel_case(&[json!("double__under")]).unwrap(), json!("double_Under"));
        assert_eq!(to_camel_case(&[json!("plain")]).unwrap(), json!("plain"));
        assert!(to_camel_case(&[json!(1)]).is_err());
    }

    #[test]
    fn test_parse_json() {
        assert_eq!(parse_json(&[json!("{\"title\": \"foo\"}")]).unwrap(), json!({"title": "foo"}));
        assert!(parse_json(&[json!("{not json")]).is_err());
        assert!(parse_json(&[Value::Null]).is_err());
        assert!(parse_json(&[]).is_err());
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "TRUE", "1", "t", "y", "Yes"] {
            assert_eq!(parse_bool(&[json!(truthy)]).unwrap(), json!(true), "{}", truthy);
        }
        for falsy in ["false", "0", "no", ""] {
            assert_eq!(parse_bool(&[json!(falsy)]).unwrap(), json!(false), "{}", falsy);
        }
        assert_eq!(parse_bool(&[json!(true)]).unwrap(), json!(true));
        assert!(parse_bool(&[json!(3)]).is_err());
    }
}
