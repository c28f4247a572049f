//! Schema Registry
//!
//! Maps schema names to their current definition. Plain creation is cached
//! by name; extension merges a bundle into whatever is registered and stores
//! the flattened result.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::behavior::{Behavior, Bundle};
use crate::config::{JsxnConfig, Redefine, RegistryConfig};
use crate::error::{RecordError, Result};
use crate::record::Record;
use crate::schema::Schema;
use crate::source::{Args, Source};

/// The schema store
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    /// Current definition per name
    schemas: HashMap<String, Arc<Schema>>,
    /// Policies applied to new schemas and re-registration
    policy: RegistryConfig,
}

impl SchemaRegistry {
    /// An empty registry with default policies
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: RegistryConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            policy,
        }
    }

    pub fn from_config(config: &JsxnConfig) -> Self {
        Self::with_policy(config.registry)
    }

    pub fn policy(&self) -> RegistryConfig {
        self.policy
    }

    /// Register a schema whose fields come from `source`.
    ///
    /// If `name` is already registered with the same field set, the cached
    /// schema is returned as is. A different field set is handled according
    /// to the `on_redefine` policy.
    pub fn create(&mut self, name: &str, source: impl Into<Source>) -> Result<Arc<Schema>> {
        let prepared = Args::new().positional(source).prepare()?;
        let fields = prepared.field_names()?;
        let candidate = self.plain(name, fields);
        self.register(name, candidate)
    }

    /// Register a schema under `name` that inherits from the schema `parent`.
    ///
    /// The parent's fields come first, followed by new fields from `source`,
    /// and the parent's methods are inherited. Fails with `NotFound` if
    /// `parent` is not registered. Re-registration follows the same cache and
    /// `on_redefine` rules as [`create`](Self::create).
    pub fn create_with_parent(
        &mut self,
        name: &str,
        source: impl Into<Source>,
        parent: &str,
    ) -> Result<Arc<Schema>> {
        let prepared = Args::new().positional(source).prepare()?;
        let fields = prepared.field_names()?;
        let base = self.lookup(parent)?;
        let candidate = Schema::extending(&base, name, fields, &Behavior::new());
        debug!(schema = name, parent = parent, fields = ?candidate.fields(), "derived schema");
        self.register(name, candidate)
    }

    /// Register a schema inferred from `args` and build its first record
    pub fn create_and_construct(&mut self, name: &str, args: impl Into<Args>) -> Result<Record> {
        let args = args.into();
        let kind = args.describe();
        let prepared = args.prepare()?;
        let fields = prepared.field_names()?;
        let values = prepared.into_initial_values()?;
        debug!(schema = name, source = kind, "defining schema from construction arguments");
        let candidate = self.plain(name, fields);
        let schema = self.register(name, candidate)?;
        Record::with_values(&schema, values)
    }

    fn plain(&self, name: &str, fields: Vec<String>) -> Schema {
        Schema::new(name, fields).with_unknown_fields(self.policy.unknown_fields)
    }

    fn register(&mut self, name: &str, candidate: Schema) -> Result<Arc<Schema>> {

        if let Some(existing) = self.schemas.get(name) {
            if existing.same_fields(candidate.fields()) {
                debug!(schema = name, "schema cache hit");
                return Ok(Arc::clone(existing));
            }
            match self.policy.on_redefine {
                Redefine::Keep => {
                    debug!(schema = name, "keeping cached schema, new field set ignored");
                    return Ok(Arc::clone(existing));
                }
                Redefine::Reject => {
                    return Err(RecordError::AlreadyExists {
                        name: name.to_string(),
                    });
                }
                Redefine::Replace => {
                    warn!(
                        schema = name,
                        old = ?existing.fields(),
                        new = ?candidate.fields(),
                        "replacing schema with a different field set"
                    );
                }
            }
        } else {
            debug!(schema = name, fields = ?candidate.fields(), "created schema");
        }

        let schema = Arc::new(candidate);
        self.schemas.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Merge a bundle into the schema registered under `name`.
    ///
    /// Existing fields keep their position and the bundle's new fields are
    /// appended. Bundle methods override existing ones of the same name. With
    /// nothing registered, the bundle alone defines the schema.
    ///
    /// The replaced entry becomes the new schema's parent, so each extension
    /// adds one link to the `ancestors()` chain.
    pub fn extend(&mut self, name: &str, bundle: Bundle) -> Result<Arc<Schema>> {
        let (_, fields, behavior) = bundle.into_parts();
        let schema = match self.schemas.get(name) {
            Some(base) => {
                let merged = Schema::extending(base, name, fields, &behavior);
                debug!(
                    schema = name,
                    fields = ?merged.fields(),
                    depth = merged.ancestors().count(),
                    "extended schema"
                );
                merged
            }
            None => {
                let created = Schema::new(name, fields)
                    .with_behavior(behavior)
                    .with_unknown_fields(self.policy.unknown_fields);
                debug!(schema = name, fields = ?created.fields(), "created schema from bundle");
                created
            }
        };

        let schema = Arc::new(schema);
        self.schemas.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Get a schema by name
    pub fn lookup(&self, name: &str) -> Result<Arc<Schema>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RecordError::not_found(name))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Remove a schema. Records built from it stay valid.
    pub fn delete(&mut self, name: &str) -> Result<Arc<Schema>> {
        let removed = self
            .schemas
            .remove(name)
            .ok_or_else(|| RecordError::not_found(name))?;
        debug!(schema = name, "deleted schema");
        Ok(removed)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Drop every schema
    pub fn clear(&mut self) {
        self.schemas.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownFields;
    use crate::record::FieldValue;
    use serde_json::json;

    #[test]
    fn test_create_registry() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_create_from_each_source_shape() {
        let mut registry = SchemaRegistry::new();

        let from_map = registry.create("A", json!({"x": 0, "y": 0})).unwrap();
        assert_eq!(from_map.fields(), ["x", "y"]);

        let from_text = registry.create("B", r#"{"b": 1, "a": 2}"#).unwrap();
        assert_eq!(from_text.fields(), ["b", "a"]);

        let from_schema = registry.create("C", Arc::clone(&from_map)).unwrap();
        assert_eq!(from_schema.fields(), ["x", "y"]);

        let record = Record::empty(&from_text);
        let from_record = registry.create("D", record).unwrap();
        assert_eq!(from_record.fields(), ["b", "a"]);

        let bundle = Bundle::new("Sleep").fields(["one", "two"]);
        let from_bundle = registry.create("E", bundle).unwrap();
        assert_eq!(from_bundle.fields(), ["one", "two"]);

        let from_names = registry.create("F", Source::names(["radio", "rig", "radio"])).unwrap();
        assert_eq!(from_names.fields(), ["radio", "rig"]);

        assert_eq!(registry.names(), vec!["A", "B", "C", "D", "E", "F"]);
    }

    #[test]
    fn test_create_rejects_other_shapes() {
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.create("X", json!(3)),
            Err(RecordError::InvalidSchemaSource(_))
        ));
        assert!(matches!(
            registry.create("X", "\"just a string\""),
            Err(RecordError::InvalidSchemaSource(_))
        ));
        assert!(matches!(
            registry.create("X", "not json"),
            Err(RecordError::InvalidJson(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut registry = SchemaRegistry::new();
        let first = registry.create("Point", json!({"x": 0, "y": 0})).unwrap();
        let second = registry.create("Point", json!({"x": 0, "y": 0})).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_create_does_not_drop_extension_behavior() {
        let mut registry = SchemaRegistry::new();
        registry
            .extend(
                "Point",
                Bundle::new("Point")
                    .fields(["x", "y"])
                    .method("norm", |_, _| Ok(FieldValue::from(0))),
            )
            .unwrap();
        let again = registry.create("Point", json!({"x": 1, "y": 1})).unwrap();
        assert!(again.behavior().contains("norm"));
    }

    #[test]
    fn test_create_with_parent_inherits() {
        let mut registry = SchemaRegistry::new();
        let base = registry
            .extend(
                "Base",
                Bundle::new("Base")
                    .field("a")
                    .method("m", |_, _| Ok(FieldValue::from("base"))),
            )
            .unwrap();

        let child = registry
            .create_with_parent("Child", Source::names(["b", "a", "c"]), "Base")
            .unwrap();
        assert_eq!(child.name(), "Child");
        assert_eq!(child.fields(), ["a", "b", "c"]);
        assert!(Arc::ptr_eq(child.parent().unwrap(), &base));
        assert!(child.behavior().contains("m"));
        assert!(Arc::ptr_eq(&registry.lookup("Child").unwrap(), &child));
        assert_eq!(registry.lookup("Base").unwrap().fields(), ["a"]);

        let mut record = Record::construct(&child, json!({"a": 1, "c": 3})).unwrap();
        assert_eq!(record.to_text(), r#"{"a":1,"b":null,"c":3}"#);
        assert_eq!(record.call("m", &[]).unwrap(), FieldValue::from("base"));
    }

    #[test]
    fn test_create_with_parent_cached_and_missing() {
        let mut registry = SchemaRegistry::new();
        registry.create("Base", Source::names(["a"])).unwrap();
        let first = registry.create_with_parent("Child", json!({"b": 0}), "Base").unwrap();
        let second = registry.create_with_parent("Child", json!({"b": 0}), "Base").unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert!(matches!(
            registry.create_with_parent("Orphan", json!({"b": 0}), "Missing"),
            Err(RecordError::NotFound { ref name }) if name == "Missing"
        ));
        assert!(!registry.contains("Orphan"));
    }

    #[test]
    fn test_redefine_keep() {
        let mut registry = SchemaRegistry::new();
        registry.create("Point", json!({"x": 0, "y": 0})).unwrap();
        let kept = registry.create("Point", json!({"a": 0})).unwrap();
        assert_eq!(kept.fields(), ["x", "y"]);
    }

    #[test]
    fn test_redefine_replace_keeps_old_records() {
        let mut registry = SchemaRegistry::with_policy(RegistryConfig {
            on_redefine: Redefine::Replace,
            ..RegistryConfig::default()
        });
        let old = registry.create("Point", json!({"x": 0, "y": 0})).unwrap();
        let record = Record::construct(&old, json!({"x": 1})).unwrap();

        let replaced = registry.create("Point", json!({"a": 0})).unwrap();
        assert_eq!(replaced.fields(), ["a"]);
        assert_eq!(registry.lookup("Point").unwrap().fields(), ["a"]);
        assert_eq!(record.to_text(), r#"{"x":1,"y":null}"#);
    }

    #[test]
    fn test_redefine_reject() {
        let mut registry = SchemaRegistry::with_policy(RegistryConfig {
            on_redefine: Redefine::Reject,
            ..RegistryConfig::default()
        });
        registry.create("Point", json!({"x": 0, "y": 0})).unwrap();
        assert!(registry.create("Point", json!({"x": 0, "y": 0})).is_ok());
        assert!(matches!(
            registry.create("Point", json!({"a": 0})),
            Err(RecordError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_create_and_construct() {
        let mut registry = SchemaRegistry::new();
        let record = registry.create_and_construct("Widget", json!({"a": 1})).unwrap();
        assert_eq!(record.get("a").unwrap(), &FieldValue::from(1));
        assert_eq!(registry.lookup("Widget").unwrap().fields(), ["a"]);

        let declared = registry
            .create_and_construct("radios", Source::names(["radio", "rig"]))
            .unwrap();
        assert_eq!(declared.to_text(), r#"{"radio":null,"rig":null}"#);
    }

    #[test]
    fn test_create_and_construct_too_many_arguments() {
        let mut registry = SchemaRegistry::new();
        let args = Args::new().positional(json!({"a": 1})).positional(json!({"b": 1}));
        assert!(matches!(
            registry.create_and_construct("Widget", args),
            Err(RecordError::TooManyArguments { count: 2 })
        ));
        assert!(!registry.contains("Widget"));
    }

    #[test]
    fn test_extend_merges() {
        let mut registry = SchemaRegistry::new();
        registry
            .extend(
                "A",
                Bundle::new("A")
                    .fields(["x", "y"])
                    .method("who", |_, _| Ok(FieldValue::from("old")))
                    .method("keep", |_, _| Ok(FieldValue::from("kept"))),
            )
            .unwrap();
        let merged = registry
            .extend(
                "A",
                Bundle::new("A")
                    .fields(["y", "z"])
                    .method("who", |_, _| Ok(FieldValue::from("new"))),
            )
            .unwrap();

        assert_eq!(merged.fields(), ["x", "y", "z"]);
        assert_eq!(merged.parent().unwrap().fields(), ["x", "y"]);

        let mut record = Record::empty(&merged);
        assert_eq!(record.call("who", &[]).unwrap(), FieldValue::from("new"));
        assert_eq!(record.call("keep", &[]).unwrap(), FieldValue::from("kept"));
    }

    #[test]
    fn test_extend_chain_records_each_definition() {
        let mut registry = SchemaRegistry::new();
        registry.extend("A", Bundle::new("A").field("x")).unwrap();
        registry.extend("A", Bundle::new("A").field("y")).unwrap();
        let latest = registry.extend("A", Bundle::new("A").field("z")).unwrap();

        let lineage: Vec<_> = latest.ancestors().map(|schema| schema.fields().to_vec()).collect();
        assert_eq!(lineage, vec![vec!["x", "y"], vec!["x"]]);
        assert_eq!(latest.fields(), ["x", "y", "z"]);
    }

    #[test]
    fn test_extend_keeps_policy() {
        let mut registry = SchemaRegistry::with_policy(RegistryConfig {
            unknown_fields: UnknownFields::Ignore,
            ..RegistryConfig::default()
        });
        let schema = registry.extend("A", Bundle::new("A").field("x")).unwrap();
        assert_eq!(schema.unknown_fields(), UnknownFields::Ignore);
        let merged = registry.extend("A", Bundle::new("A").field("y")).unwrap();
        assert_eq!(merged.unknown_fields(), UnknownFields::Ignore);
    }

    #[test]
    fn test_delete() {
        let mut registry = SchemaRegistry::new();
        let schema = registry.create("Point", json!({"x": 0})).unwrap();
        let record = Record::construct(&schema, json!({"x": 3})).unwrap();

        registry.delete("Point").unwrap();
        assert!(matches!(registry.lookup("Point"), Err(RecordError::NotFound { .. })));
        assert!(matches!(registry.delete("Point"), Err(RecordError::NotFound { .. })));
        assert_eq!(record.to_text(), r#"{"x":3}"#);
    }

    #[test]
    fn test_clear() {
        let mut registry = SchemaRegistry::new();
        registry.create("A", Source::names(["a"])).unwrap();
        registry.create("B", Source::names(["b"])).unwrap();
        assert_eq!(registry.len(), 2);
        registry.clear();
        assert!(registry.is_empty());
    }
}
