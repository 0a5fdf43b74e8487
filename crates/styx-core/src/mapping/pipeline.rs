//! Process pipeline
//!
//! Runs a definition's pre- or postprocessing steps over one working
//! object. Steps are applied strictly in key order and each step sees the
//! effect of the previous one.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use crate::definition::ProcessStep;
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

use super::policy::Outcome;

/// Which side of field extraction a pipeline runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preprocess,
    Postprocess,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Preprocess => write!(f, "preprocess"),
            Stage::Postprocess => write!(f, "postprocess"),
        }
    }
}

/// An ordered list of steps bound to the type that declares them
#[derive(Debug, Clone, Copy)]
pub struct ProcessPipeline<'a> {
    type_name: &'a str,
    stage: Stage,
    steps: &'a [ProcessStep],
}

impl<'a> ProcessPipeline<'a> {
    /// `steps` must already be sorted by key, as the definition parser leaves them
    pub fn new(type_name: &'a str, stage: Stage, steps: &'a [ProcessStep]) -> Self {
        Self {
            type_name,
            stage,
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step to `obj` in order
    pub fn run(&self, mut obj: Value) -> Result<Value> {
        for step in self.steps {
            let location = format!("{}.{}.{}", self.type_name, self.stage, step.key);
            tracing::debug!(location = %location, function = step.function.name(), many = step.many, "Running step");

            if step.many {
                self.run_many(step, &mut obj, &location)?;
            } else {
                apply_step(step, &mut obj, &location)?;
            }
        }
        Ok(obj)
    }

    fn run_many(&self, step: &ProcessStep, obj: &mut Value, location: &str) -> Result<()> {
        match obj {
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    apply_step(step, item, &format!("{}.{}", location, index))?;
                }
                Ok(())
            }
            other => {
                let result = Err(Error::transform(
                    location,
                    format!("step applies to each element but the working object is a {}", kind(other)),
                ));
                match step.on_throw.apply(result, step.or_else.as_ref(), location)? {
                    Outcome::Value(value) => write_output(step, other, value, location),
                    Outcome::Skip => Ok(()),
                }
            }
        }
    }
}

/// Resolve the inputs, call the function and write the result under the step's policy
fn apply_step(step: &ProcessStep, obj: &mut Value, location: &str) -> Result<()> {
    let args: Vec<Value> = step
        .inputs
        .iter()
        .map(|input| input.resolve(obj, step.or_else.as_ref()))
        .collect();

    let result = step
        .function
        .call(&args)
        .map_err(|e| Error::function_failed(location, step.function.name(), e));

    match step.on_throw.apply(result, step.or_else.as_ref(), location)? {
        Outcome::Value(value) => write_output(step, obj, value, location),
        Outcome::Skip => Ok(()),
    }
}

/// Write a step result; a failed write falls under the step's policy too
fn write_output(step: &ProcessStep, obj: &mut Value, value: Value, location: &str) -> Result<()> {
    let Err(err) = step.output.write(obj, value) else {
        return Ok(());
    };

    let failed = Err(Error::write_failed(location, err));
    match step.on_throw.apply(failed, step.or_else.as_ref(), location)? {
        Outcome::Value(fallback) => step
            .output
            .write(obj, fallback)
            .map_err(|e| Error::write_failed(location, e)),
        Outcome::Skip => Ok(()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
