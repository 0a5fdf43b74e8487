//! Failure policy applied to steps and fields

use crate::definition::OnThrow;
use crate::Result;
use serde_json::Value;

/// What a step or field produces once its policy has been applied
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Write this value
    Value(Value),
    /// Write nothing
    Skip,
}

impl OnThrow {
    /// Interpret a step or field result under this policy.
    ///
    /// Only recoverable errors are absorbed. Anything else, and every error
    /// under [`OnThrow::Throw`], is returned unchanged.
    pub fn apply(self, result: Result<Value>, or_else: Option<&Value>, location: &str) -> Result<Outcome> {
        let err = match result {
            Ok(value) => return Ok(Outcome::Value(value)),
            Err(err) => err,
        };

        if self == OnThrow::Throw || !err.is_recoverable() {
            return Err(err);
        }

        tracing::warn!(location = %location, policy = %self, error = %err, "Failure absorbed by on_throw policy");

        Ok(match self {
            OnThrow::OrElse => Outcome::Value(or_else.cloned().unwrap_or(Value::Null)),
            _ => Outcome::Skip,
        })
    }
}
