//! Type registry
//!
//! Construction happens in two phases. Phase one parses every definition
//! into its own [`Mapper`] with an empty link table. Phase two, once every
//! mapper exists, resolves each nested type name into a [`TypeId`] index
//! into the registry's mapper table. Definitions can therefore refer to
//! types declared later, or to each other, without any reference cycles.
//!
//! Copyright (c) 2025 Styx Team
//! Licensed under the Apache-2.0 license

use crate::definition::{DefinitionParser, TypeDefinition};
use crate::functions::{FunctionManifest, FunctionRegistry};
use crate::{Error, Result};
use serde_json::Value;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::fields::FieldsMapper;
use super::pipeline::{ProcessPipeline, Stage};

/// How many nested-type delegations one mapping call may make
pub const MAX_NESTING_DEPTH: usize = 32;

/// Index of a mapper in its registry's mapper table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// The compiled form of one type definition
#[derive(Debug)]
pub struct Mapper {
    definition: TypeDefinition,
    links: HashMap<String, TypeId>,
}

impl Mapper {
    fn new(definition: TypeDefinition) -> Self {
        Self {
            definition,
            links: HashMap::new(),
        }
    }

    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }

    /// Registry handle for a nested type, if phase two found one
    pub(crate) fn link(&self, type_name: &str) -> Option<TypeId> {
        self.links.get(type_name).copied()
    }

    fn map(&self, registry: &TypeRegistry, source: &Value, depth: usize) -> Result<Value> {
        if !self.definition.many {
            return self.map_one(registry, source, depth);
        }

        let items = source.as_array().ok_or_else(|| {
            Error::transform(
                self.definition.name.as_str(),
                "type is declared 'many' but the source is not a sequence",
            )
        })?;

        items
            .iter()
            .map(|item| self.map_one(registry, item, depth))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    fn map_one(&self, registry: &TypeRegistry, source: &Value, depth: usize) -> Result<Value> {
        let name = self.definition.name.as_str();

        let working = ProcessPipeline::new(name, Stage::Preprocess, &self.definition.preprocess).run(source.clone())?;
        let target = FieldsMapper::new(registry, self, depth).map(&working)?;
        ProcessPipeline::new(name, Stage::Postprocess, &self.definition.postprocess).run(target)
    }
}

/// A mapper bound to the registry that owns it
#[derive(Clone, Copy)]
pub struct MapperRef<'r> {
    registry: &'r TypeRegistry,
    id: TypeId,
}

impl<'r> MapperRef<'r> {
    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'r str {
        &self.mapper().definition.name
    }

    pub fn definition(&self) -> &'r TypeDefinition {
        &self.mapper().definition
    }

    /// Map `source` into a new target object.
    ///
    /// `source` is never modified; preprocessing runs on a private copy.
    pub fn map(&self, source: &Value) -> Result<Value> {
        tracing::debug!(type_name = self.name(), "Mapping object");
        self.mapper().map(self.registry, source, 0)
    }

    /// Map on behalf of a field, `depth` delegations below the top-level call
    pub(crate) fn map_nested(&self, source: &Value, depth: usize) -> Result<Value> {
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::RecursionLimit {
                type_name: self.name().to_string(),
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.mapper().map(self.registry, source, depth)
    }

    fn mapper(&self) -> &'r Mapper {
        &self.registry.mappers[self.id.0]
    }
}

impl fmt::Debug for MapperRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Mapper", self.name())
    }
}

/// Frozen table of mappers, keyed by type name
#[derive(Debug)]
pub struct TypeRegistry {
    functions: Arc<FunctionRegistry>,
    mappers: Vec<Mapper>,
    index: HashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn builder(functions: impl Into<Arc<FunctionRegistry>>) -> TypeRegistryBuilder {
        TypeRegistryBuilder::new(functions)
    }

    /// Look up the mapper for a type
    pub fn get(&self, name: &str) -> Option<MapperRef<'_>> {
        self.index.get(name).map(|&id| self.mapper(id))
    }

    /// Map `source` with the named type's mapper
    pub fn map(&self, name: &str, source: &Value) -> Result<Value> {
        self.get(name)
            .ok_or_else(|| Error::UnknownType { name: name.to_string() })?
            .map(source)
    }

    /// Registered type names in sorted order
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    pub(crate) fn mapper(&self, id: TypeId) -> MapperRef<'_> {
        MapperRef { registry: self, id }
    }
}

/// Owned builder for a [`TypeRegistry`]
#[derive(Debug)]
pub struct TypeRegistryBuilder {
    functions: Arc<FunctionRegistry>,
    definitions: Vec<TypeDefinition>,
}

impl TypeRegistryBuilder {
    pub fn new(functions: impl Into<Arc<FunctionRegistry>>) -> Self {
        Self {
            functions: functions.into(),
            definitions: Vec::new(),
        }
    }

    /// Check the function registry against a declared manifest
    pub fn manifest(self, manifest: &FunctionManifest) -> Result<Self> {
        self.functions.validate_manifest(manifest)?;
        Ok(self)
    }

    /// Parse and add one raw definition
    pub fn definition(mut self, raw: &Value) -> Result<Self> {
        let parsed = DefinitionParser::new(&self.functions).parse(raw)?;
        self.add_definition(parsed)?;
        Ok(self)
    }

    /// Add an already parsed definition; type names must be unique
    pub fn add_definition(&mut self, definition: TypeDefinition) -> Result<&mut Self> {
        if self.definitions.iter().any(|d| d.name == definition.name) {
            return Err(Error::schema(
                definition.name.as_str(),
                "type",
                format!("Duplicate type name: {}", definition.name),
            ));
        }
        self.definitions.push(definition);
        Ok(self)
    }

    /// Phase one builds the mappers, phase two links nested types
    pub fn build(self) -> TypeRegistry {
        let mut mappers: Vec<Mapper> = self.definitions.into_iter().map(Mapper::new).collect();

        let index: HashMap<String, TypeId> = mappers
            .iter()
            .enumerate()
            .map(|(i, mapper)| (mapper.definition.name.clone(), TypeId(i)))
            .collect();

        for mapper in &mut mappers {
            let nested: Vec<String> = mapper.definition.nested_types().map(str::to_string).collect();
            for type_name in nested {
                match index.get(&type_name) {
                    Some(&id) => {
                        mapper.links.insert(type_name, id);
                    }
                    None => tracing::warn!(
                        type_name = %mapper.definition.name,
                        nested_type = %type_name,
                        "Nested type has no definition; mapping it will fail"
                    ),
                }
            }
        }

        tracing::info!(types = mappers.len(), functions = self.functions.len(), "Type registry built");

        TypeRegistry {
            functions: self.functions,
            mappers,
            index,
        }
    }
}

/// Build a registry from raw definitions in one go.
///
/// No function manifest is checked; see [`build_with_manifest`].
pub fn build<I>(definitions: I, functions: impl Into<Arc<FunctionRegistry>>) -> Result<TypeRegistry>
where
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    add_all(TypeRegistryBuilder::new(functions), definitions)
}

/// Like [`build`], but first checks the functions against a declared manifest
pub fn build_with_manifest<I>(
    definitions: I,
    functions: impl Into<Arc<FunctionRegistry>>,
    manifest: &FunctionManifest,
) -> Result<TypeRegistry>
where
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    add_all(TypeRegistryBuilder::new(functions).manifest(manifest)?, definitions)
}

fn add_all<I>(builder: TypeRegistryBuilder, definitions: I) -> Result<TypeRegistry>
where
    I: IntoIterator,
    I::Item: Borrow<Value>,
{
    definitions
        .into_iter()
        .try_fold(builder, |builder, raw| builder.definition(raw.borrow()))
        .map(TypeRegistryBuilder::build)
}
