//! Behavior bundles and method tables
//!
//! A [`Bundle`] is what gets handed to the decorator path: a name, a list of
//! declared (but unassigned) fields, and a set of named methods. Once
//! registered, the methods live in the schema's [`Behavior`] table and are
//! invoked through [`Record::call`](crate::Record::call).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::record::{FieldValue, Record};

/// A method attached to a schema
pub type Method = Arc<dyn Fn(&mut Record, &[FieldValue]) -> Result<FieldValue> + Send + Sync>;

/// Method table keyed by method name
#[derive(Clone, Default)]
pub struct Behavior {
    methods: BTreeMap<String, Method>,
}

impl Behavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a method
    pub fn insert(&mut self, name: impl Into<String>, method: Method) -> Option<Method> {
        self.methods.insert(name.into(), method)
    }

    /// Add or replace a method from a closure
    pub fn define<F>(&mut self, name: impl Into<String>, method: F) -> Option<Method>
    where
        F: Fn(&mut Record, &[FieldValue]) -> Result<FieldValue> + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(method))
    }

    pub fn get(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Method names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Combine two tables. Methods from `overlay` win on name collision.
    pub fn merged(&self, overlay: &Behavior) -> Behavior {
        let mut methods = self.methods.clone();
        for (name, method) in &overlay.methods {
            methods.insert(name.clone(), Arc::clone(method));
        }
        Behavior { methods }
    }
}

impl fmt::Debug for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods.keys()).finish()
    }
}

/// An externally authored set of field declarations and methods
#[derive(Clone, Debug)]
pub struct Bundle {
    name: String,
    fields: Vec<String>,
    behavior: Behavior,
}

impl Bundle {
    /// Start a bundle with its declared name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            behavior: Behavior::new(),
        }
    }

    /// Declare a field. Declaring the same name twice keeps the first position.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.fields.contains(&name) {
            self.fields.push(name);
        }
        self
    }

    /// Declare several fields in order
    pub fn fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |bundle, name| bundle.field(name))
    }

    /// Attach a method
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Record, &[FieldValue]) -> Result<FieldValue> + Send + Sync + 'static,
    {
        self.behavior.define(name, method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub(crate) fn into_parts(self) -> (String, Vec<String>, Behavior) {
        (self.name, self.fields, self.behavior)
    }
}
