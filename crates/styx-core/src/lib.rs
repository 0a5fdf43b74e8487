//! Styx Core - Declarative object mapping engine
//!
//! This crate turns declarative mapping definitions into mappers that
//! convert arbitrary nested source objects into target objects.
//!
//! # Main Components
//!
//! - **Error Handling**: One error taxonomy using `thiserror`, with `anyhow` for user functions
//! - **Path Resolution**: Get and set values at `.`-delimited paths
//! - **Functions**: Named transformation functions checked against a declared manifest
//! - **Definitions**: Validating parser from raw documents to a typed definition
//! - **Mapping**: Process pipelines, field resolution and the two-phase type registry
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use styx_core::{FunctionRegistry, Result, TypeRegistry};
//!
//! fn example() -> Result<()> {
//!     let registry = TypeRegistry::builder(FunctionRegistry::with_built_ins())
//!         .definition(&json!({
//!             "type": "Creature",
//!             "fields": {
//!                 "name": {"input_paths": ["fields.full_name"]},
//!                 "animal": {
//!                     "input_paths": ["fields.worlds_best_animal"],
//!                     "function": "to_camel_case",
//!                     "or_else": "black_cat"
//!                 }
//!             }
//!         }))?
//!         .build();
//!
//!     let target = registry.map("Creature", &json!({"fields": {"full_name": "Heracles"}}))?;
//!     assert_eq!(target, json!({"animal": "blackCat", "name": "Heracles"}));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod definition;
pub mod error;
pub mod functions;
pub mod mapping;
pub mod path;

// Re-export main types for convenience
pub use error::{Error, MatchCount, Result};
pub use definition::{OnThrow, TypeDefinition, TYPE_TAG};
pub use functions::{FunctionManifest, FunctionRef, FunctionRegistry, TransformFn};
pub use mapping::{build, build_with_manifest, MapperRef, TypeRegistry, TypeRegistryBuilder, MAX_NESTING_DEPTH};
pub use path::{InputSource, OutputTarget, PathError, ValuePath};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
