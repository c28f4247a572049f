//! Construction arguments
//!
//! Every construction or re-population call takes an [`Args`]: zero or one
//! positional [`Source`] plus any number of named fields. Before use the
//! arguments are normalized into either field assignments or a bare field
//! declaration, so the record and registry paths agree on what each input
//! shape means.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::behavior::Bundle;
use crate::error::{RecordError, Result};
use crate::record::{FieldValue, Record};
use crate::schema::Schema;

/// A single positional construction value or field source
#[derive(Debug, Clone)]
pub enum Source {
    /// JSON object: keys are fields, values are assigned
    Object(Map<String, Value>),
    /// JSON text, parsed before use
    Text(String),
    /// Any other JSON value. Objects and arrays of strings are recognized.
    Json(Value),
    /// Existing record: its field/value pairs are copied
    Record(Record),
    /// Existing schema: its field names are reused
    Schema(Arc<Schema>),
    /// Declared fields of a behavior bundle
    Bundle(Bundle),
    /// Plain ordered field names
    Names(Vec<String>),
}

impl Source {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Source::Names(names.into_iter().map(Into::into).collect())
    }

    fn prepare(self) -> Result<Prepared> {
        match self {
            Source::Object(map) => Ok(Prepared::from_map(map)),
            Source::Text(text) => {
                let value: Value = serde_json::from_str(&text)?;
                Ok(Prepared::from_json(value))
            }
            Source::Json(value) => Ok(Prepared::from_json(value)),
            Source::Record(record) => Ok(Prepared::Values(record.into_pairs())),
            Source::Schema(schema) => Ok(Prepared::Declaration(schema.fields().to_vec())),
            Source::Bundle(bundle) => Ok(Prepared::Declaration(bundle.declared_fields().to_vec())),
            Source::Names(names) => Ok(Prepared::Declaration(names)),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Source::Object(_) => "object",
            Source::Text(_) => "text",
            Source::Json(_) => "json",
            Source::Record(_) => "record",
            Source::Schema(_) => "schema",
            Source::Bundle(_) => "bundle",
            Source::Names(_) => "names",
        }
    }
}

impl From<Map<String, Value>> for Source {
    fn from(map: Map<String, Value>) -> Self {
        Source::Object(map)
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Source::Object(map),
            other => Source::Json(other),
        }
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<Record> for Source {
    fn from(record: Record) -> Self {
        Source::Record(record)
    }
}

impl From<&Record> for Source {
    fn from(record: &Record) -> Self {
        Source::Record(record.clone())
    }
}

impl From<Arc<Schema>> for Source {
    fn from(schema: Arc<Schema>) -> Self {
        Source::Schema(schema)
    }
}

impl From<Bundle> for Source {
    fn from(bundle: Bundle) -> Self {
        Source::Bundle(bundle)
    }
}

impl From<Vec<String>> for Source {
    fn from(names: Vec<String>) -> Self {
        Source::Names(names)
    }
}

/// Positional and named construction arguments
#[derive(Debug, Clone, Default)]
pub struct Args {
    positional: Vec<Source>,
    named: Vec<(String, FieldValue)>,
}

impl Args {
    /// No arguments: every field stays null
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional value
    pub fn positional(mut self, source: impl Into<Source>) -> Self {
        self.positional.push(source.into());
        self
    }

    /// Add a named field value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.named.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Normalize into assignments or a field declaration
    pub(crate) fn prepare(self) -> Result<Prepared> {
        let Args { positional, named } = self;
        let count = positional.len() + usize::from(!named.is_empty());
        if count > 1 {
            return Err(RecordError::TooManyArguments { count });
        }
        match positional.into_iter().next() {
            Some(source) => source.prepare(),
            None => Ok(Prepared::Values(named)),
        }
    }

    /// Kind of the positional value, for error messages
    pub(crate) fn describe(&self) -> &'static str {
        self.positional.first().map_or("named fields", Source::describe)
    }
}

macro_rules! args_from_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Args {
                fn from(source: $ty) -> Self {
                    Args::new().positional(source)
                }
            }
        )*
    };
}

args_from_source!(
    Source,
    Map<String, Value>,
    Value,
    &str,
    String,
    Record,
    &Record,
    Arc<Schema>,
    Bundle,
    Vec<String>,
);

/// Arguments after parsing
#[derive(Debug)]
pub(crate) enum Prepared {
    /// Field assignments in source order
    Values(Vec<(String, FieldValue)>),
    /// Field names only, nothing to assign
    Declaration(Vec<String>),
    /// A JSON value that is neither an object nor an array of names
    Unrecognized(&'static str),
}

impl Prepared {
    fn from_map(map: Map<String, Value>) -> Self {
        Prepared::Values(
            map.into_iter()
                .map(|(key, value)| (key, FieldValue::Json(value)))
                .collect(),
        )
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Some(name),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map_or(Prepared::Unrecognized("array"), Prepared::Declaration),
            Value::Null => Prepared::Unrecognized("null"),
            Value::Bool(_) => Prepared::Unrecognized("boolean"),
            Value::Number(_) => Prepared::Unrecognized("number"),
            Value::String(_) => Prepared::Unrecognized("string"),
        }
    }

    /// Field names this input defines, in order
    pub(crate) fn field_names(&self) -> Result<Vec<String>> {
        match self {
            Prepared::Values(pairs) => Ok(pairs.iter().map(|(key, _)| key.clone()).collect()),
            Prepared::Declaration(names) => Ok(names.clone()),
            Prepared::Unrecognized(kind) => Err(RecordError::InvalidSchemaSource(format!(
                "cannot derive fields from a JSON {kind}"
            ))),
        }
    }

    /// Assignments this input carries, or `InvalidSource`
    pub(crate) fn into_values(self) -> Result<Vec<(String, FieldValue)>> {
        match self {
            Prepared::Values(pairs) => Ok(pairs),
            Prepared::Declaration(_) => Err(RecordError::InvalidSource(
                "field declarations carry no values".to_string(),
            )),
            Prepared::Unrecognized(kind) => Err(RecordError::InvalidSource(format!(
                "expected an object, JSON text or record, got a JSON {kind}"
            ))),
        }
    }

    /// Assignments for a construct-and-register call: declarations assign nothing
    pub(crate) fn into_initial_values(self) -> Result<Vec<(String, FieldValue)>> {
        match self {
            Prepared::Declaration(_) => Ok(Vec::new()),
            other => other.into_values(),
        }
    }
}
