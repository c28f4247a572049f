//! Record factory
//!
//! [`Jsxn`] is the caller-facing entry point. Resolving a name yields either
//! the registered schema or a deferred constructor that defines the schema
//! from its first set of construction arguments.

use std::sync::Arc;

use crate::behavior::Bundle;
use crate::config::JsxnConfig;
use crate::error::Result;
use crate::record::Record;
use crate::registry::SchemaRegistry;
use crate::schema::Schema;
use crate::source::Args;

/// Factory facade over an owned registry
#[derive(Debug, Default)]
pub struct Jsxn {
    registry: SchemaRegistry,
}

impl Jsxn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn from_config(config: &JsxnConfig) -> Self {
        Self::with_registry(SchemaRegistry::from_config(config))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> SchemaRegistry {
        self.registry
    }

    /// Resolve a name to its schema, or to a constructor that will define it
    pub fn resolve(&mut self, name: &str) -> Resolved<'_> {
        if let Some(schema) = self.registry.get(name).cloned() {
            return Resolved::Schema(schema);
        }
        Resolved::Deferred(Deferred {
            registry: &mut self.registry,
            name: name.to_string(),
        })
    }

    /// Shorthand for `resolve(name).construct(args)`
    pub fn construct(&mut self, name: &str, args: impl Into<Args>) -> Result<Record> {
        self.resolve(name).construct(args)
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<Schema>> {
        self.registry.lookup(name)
    }

    /// Register a bundle under its own declared name
    pub fn decorate(&mut self, bundle: Bundle) -> Result<Arc<Schema>> {
        self.decorator().apply(bundle)
    }

    /// A decorator that registers bundles under their own declared name
    pub fn decorator(&mut self) -> Decorator<'_> {
        Decorator {
            registry: &mut self.registry,
            name: None,
        }
    }

    /// A decorator that registers bundles under `name`
    pub fn decorate_as(&mut self, name: impl Into<String>) -> Decorator<'_> {
        Decorator {
            registry: &mut self.registry,
            name: Some(name.into()),
        }
    }

    pub fn delete(&mut self, name: &str) -> Result<Arc<Schema>> {
        self.registry.delete(name)
    }
}

/// Result of [`Jsxn::resolve`]
#[derive(Debug)]
pub enum Resolved<'a> {
    /// The name is registered
    Schema(Arc<Schema>),
    /// The name is free; constructing will register it
    Deferred(Deferred<'a>),
}

impl Resolved<'_> {
    /// Build a record, registering the schema first if needed
    pub fn construct(self, args: impl Into<Args>) -> Result<Record> {
        match self {
            Resolved::Schema(schema) => Record::construct(&schema, args),
            Resolved::Deferred(deferred) => deferred.construct(args),
        }
    }

    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match self {
            Resolved::Schema(schema) => Some(schema),
            Resolved::Deferred(_) => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Resolved::Schema(_))
    }
}

/// A pending create-and-construct bound to a name
#[derive(Debug)]
pub struct Deferred<'a> {
    registry: &'a mut SchemaRegistry,
    name: String,
}

impl Deferred<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Define the schema from `args` and return its first record
    pub fn construct(self, args: impl Into<Args>) -> Result<Record> {
        self.registry.create_and_construct(&self.name, args)
    }
}

/// Registers bundles through [`SchemaRegistry::extend`]
#[derive(Debug)]
pub struct Decorator<'a> {
    registry: &'a mut SchemaRegistry,
    name: Option<String>,
}

impl Decorator<'_> {
    pub fn apply(self, bundle: Bundle) -> Result<Arc<Schema>> {
        let name = self.name.unwrap_or_else(|| bundle.name().to_string());
        self.registry.extend(&name, bundle)
    }
}
