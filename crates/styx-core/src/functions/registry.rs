//! Function registry and manifest validation
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use super::built_in;

/// A pure n-ary function over JSON values
pub type TransformFn = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// A function resolved from the registry by name
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    call: TransformFn,
}

impl FunctionRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function with positional arguments
    pub fn call(&self, args: &[Value]) -> anyhow::Result<Value> {
        (self.call)(args)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionRef").field(&self.name).finish()
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        // Compare only by name for function pointers
        self.name == other.name
    }
}

/// Name→callable table shared by every mapper of a registry
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, TransformFn>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in functions
    pub fn with_built_ins() -> Self {
        let mut registry = Self::new();
        for (name, function) in built_in::all() {
            registry.functions.insert(name.to_string(), function);
        }
        registry
    }

    /// Register a function under `name`.
    ///
    /// Registering the same name twice is an error.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> Result<&mut Self>
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.functions.contains_key(&name) {
            return Err(Error::FunctionManifest {
                message: format!("Duplicate function name: {}", name),
                names: vec![name],
            });
        }
        self.functions.insert(name, Arc::new(function));
        Ok(self)
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with<F>(mut self, name: impl Into<String>, function: F) -> Result<Self>
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(name, function)?;
        Ok(self)
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<FunctionRef> {
        self.functions.get(name).map(|call| FunctionRef {
            name: name.to_string(),
            call: Arc::clone(call),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Check that the declared manifest and the registered names agree.
    ///
    /// Names declared but never registered, and names registered but never
    /// declared, are both fatal.
    pub fn validate_manifest(&self, manifest: &FunctionManifest) -> Result<()> {
        let declared: BTreeSet<&str> = manifest.functions.iter().map(String::as_str).collect();
        let registered: BTreeSet<&str> = self.functions.keys().map(String::as_str).collect();

        let extra_declared: Vec<String> = declared.difference(&registered).map(|s| s.to_string()).collect();
        if !extra_declared.is_empty() {
            return Err(Error::FunctionManifest {
                message: format!(
                    "Found functions in the manifest that were not registered. Function names were: {}",
                    extra_declared.join(", ")
                ),
                names: extra_declared,
            });
        }

        let extra_registered: Vec<String> = registered.difference(&declared).map(|s| s.to_string()).collect();
        if !extra_registered.is_empty() {
            return Err(Error::FunctionManifest {
                message: format!(
                    "Found registered functions that were not declared in the manifest. Function names were: {}",
                    extra_registered.join(", ")
                ),
                names: extra_registered,
            });
        }

        tracing::debug!(count = registered.len(), "Function manifest validated");
        Ok(())
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// The list of function names a deployment declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionManifest {
    pub functions: Vec<String>,
}

impl FunctionManifest {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            functions: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Declare exactly the names a registry already holds
    pub fn from_registry(registry: &FunctionRegistry) -> Self {
        Self::new(registry.names())
    }

    /// Read a manifest document of the form `{"functions": [names]}`
    pub fn from_value(value: &Value) -> Result<Self> {
        let functions = value.get("functions").ok_or_else(|| Error::FunctionManifest {
            message: "Manifest was malformed. No 'functions' list found.".to_string(),
            names: Vec::new(),
        })?;

        let names = functions
            .as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| Error::FunctionManifest {
                message: "Manifest was malformed. 'functions' key must be a list of names.".to_string(),
                names: Vec::new(),
            })?;

        Ok(Self { functions: names })
    }
}
