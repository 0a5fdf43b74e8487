//! Named transform functions
//!
//! Definitions refer to functions by name. The caller supplies the
//! name→callable table as a [`FunctionRegistry`] value, optionally seeded
//! with the [`built_in`] functions, and validates it against the manifest of
//! names a deployment declares.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

pub mod built_in;
pub mod registry;

pub use registry::{FunctionManifest, FunctionRegistry, FunctionRef, TransformFn};
