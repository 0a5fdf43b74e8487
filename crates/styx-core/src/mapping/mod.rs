//! Mapping runtime
//!
//! A [`TypeRegistry`] holds one [`Mapper`] per type definition. A mapping
//! call runs the preprocess pipeline over a private copy of the source,
//! resolves the fields into a fresh target object and runs the postprocess
//! pipeline over that target.
//!
//! ```
//! use serde_json::json;
//! use styx_core::functions::FunctionRegistry;
//! use styx_core::mapping;
//!
//! let definitions = vec![json!({
//!     "type": "Creature",
//!     "preprocess": {
//!         "01_full_name": {
//!             "input_paths": ["fields.first_name", "fields.last_name"],
//!             "output_path": "fields.full_name",
//!             "function": "concat"
//!         }
//!     },
//!     "fields": {
//!         "name": {"input_paths": ["fields.full_name"]}
//!     }
//! })];
//!
//! let registry = mapping::build(&definitions, FunctionRegistry::with_built_ins()).unwrap();
//! let source = json!({"fields": {"first_name": "Hera", "last_name": "cles"}});
//! assert_eq!(registry.map("Creature", &source).unwrap(), json!({"name": "Heracles"}));
//! ```
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

pub mod fields;
pub mod pipeline;
pub mod policy;
pub mod registry;


pub use fields::FieldsMapper;
pub use pipeline::{ProcessPipeline, Stage};
pub use policy::Outcome;
pub use registry::{build, build_with_manifest, Mapper, MapperRef, TypeId, TypeRegistry, TypeRegistryBuilder, MAX_NESTING_DEPTH};
