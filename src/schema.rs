//! Schema definitions
//!
//! A schema is a named, ordered field set plus an optional behavior table.
//! Schemas are immutable once built; the registry replaces them wholesale
//! instead of editing them in place.

use std::collections::HashMap;
use std::sync::Arc;

use crate::behavior::Behavior;
use crate::config::UnknownFields;

/// A named record shape
#[derive(Debug, Clone)]
pub struct Schema {
    /// Unique name within a registry (e.g., "Point", "radios")
    name: String,
    /// Declared field names, in declaration order
    fields: Vec<String>,
    /// Field name to position in `fields`
    index: HashMap<String, usize>,
    /// The schema this one was extended from. Fields and behavior are already
    /// flattened; the link is kept so `ancestors()` can report the lineage,
    /// and it keeps every prior definition alive for as long as this one is.
    parent: Option<Arc<Schema>>,
    /// Flattened method table (own methods plus inherited ones)
    behavior: Behavior,
    /// How `populate` treats keys the schema does not declare
    unknown_fields: UnknownFields,
}

impl Schema {
    /// Create a schema from field names. Repeated names keep their first position.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self {
            name: name.into(),
            fields: Vec::new(),
            index: HashMap::new(),
            parent: None,
            behavior: Behavior::new(),
            unknown_fields: UnknownFields::default(),
        };
        for field in fields {
            schema.push_field(field.into());
        }
        schema
    }

    /// Build the merged schema for `name` on top of `base`.
    ///
    /// Fields already in `base` keep their position; new fields are appended in
    /// declaration order. Methods in `behavior` override inherited ones.
    pub fn extending<I, S>(
        base: &Arc<Schema>,
        name: impl Into<String>,
        fields: I,
        behavior: &Behavior,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::new(name, base.fields.iter().cloned());
        for field in fields {
            schema.push_field(field.into());
        }
        schema.behavior = base.behavior.merged(behavior);
        schema.parent = Some(Arc::clone(base));
        schema.unknown_fields = base.unknown_fields;
        schema
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    fn push_field(&mut self, field: String) {
        if !self.index.contains_key(&field) {
            self.index.insert(field.clone(), self.fields.len());
            self.fields.push(field);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Position of a field in declaration order
    pub fn position(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.index.contains_key(field)
    }

    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }

    /// Walk the extension chain, nearest parent first
    pub fn ancestors(&self) -> impl Iterator<Item = &Arc<Schema>> {
        std::iter::successors(self.parent.as_ref(), |schema| schema.parent.as_ref())
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.behavior.names()
    }

    pub fn unknown_fields(&self) -> UnknownFields {
        self.unknown_fields
    }

    /// Whether two schemas declare the same fields in the same order
    pub fn same_fields(&self, fields: &[String]) -> bool {
        self.fields == fields
    }
}
