//! Mapping definitions
//!
//! A definition document is parsed once into a [`TypeDefinition`]. Paths are
//! pre-parsed and function names resolved against a [`FunctionRegistry`]
//! during the parse, so a successfully parsed definition needs no further
//! checks at mapping time.
//!
//! ```
//! use serde_json::json;
//! use styx_core::definition;
//! use styx_core::functions::FunctionRegistry;
//!
//! let functions = FunctionRegistry::with_built_ins();
//! let raw = json!({
//!     "type": "Creature",
//!     "fields": {
//!         "name": {"input_paths": ["fields.full_name"]}
//!     }
//! });
//!
//! let parsed = definition::parse(&raw, &functions).unwrap();
//! assert_eq!(parsed.name, "Creature");
//! assert_eq!(parsed.fields.len(), 1);
//! ```
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

pub mod parser;
pub mod types;


pub use parser::{parse, DefinitionParser};
pub use types::{
    CopyField, FieldDefinition, FieldSource, OnThrow, PathCondition, ProcessStep, TypeDefinition,
    ValueMap, TYPE_TAG,
};
