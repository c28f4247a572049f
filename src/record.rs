//! Records: instances of a schema
//!
//! A [`Record`] stores one value per declared field, positionally, so its key
//! set always matches its schema exactly. Fields never supplied are null.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::config::{OutputFormat, UnknownFields};
use crate::error::{RecordError, Result};
use crate::schema::Schema;
use crate::source::Args;

/// A field value: any JSON value or a nested record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(Value),
    Record(Record),
}

impl FieldValue {
    pub fn null() -> Self {
        FieldValue::Json(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Json(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FieldValue::Json(value) => Some(value),
            FieldValue::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            FieldValue::Record(record) => Some(record),
            FieldValue::Json(_) => None,
        }
    }

    /// Plain JSON form, nested records rendered as objects
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Json(value) => value.clone(),
            FieldValue::Record(record) => Value::Object(record.to_json()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::null()
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Json(value) => value.serialize(serializer),
            FieldValue::Record(record) => record.serialize(serializer),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<Record> for FieldValue {
    fn from(record: Record) -> Self {
        FieldValue::Record(record)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Json(Value::from(value))
    }
}

macro_rules! field_value_from_json {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Json(Value::from(value))
                }
            }
        )*
    };
}

field_value_from_json!(String, bool, i32, i64, u32, u64, f64);

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(FieldValue::null, Into::into)
    }
}

/// An instance of a schema
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<FieldValue>,
}

impl Record {
    /// A record with every field null
    pub fn empty(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            values: vec![FieldValue::null(); schema.field_count()],
        }
    }

    /// Build a record and populate it from `args`.
    ///
    /// Accepts no arguments, named fields, or one positional object, JSON
    /// text or record. Fields the arguments do not mention are null.
    pub fn construct(schema: &Arc<Schema>, args: impl Into<Args>) -> Result<Self> {
        let mut record = Self::empty(schema);
        record.populate(args)?;
        Ok(record)
    }

    /// Build a record from JSON object text
    pub fn from_text(schema: &Arc<Schema>, text: &str) -> Result<Self> {
        Self::construct(schema, text)
    }

    pub(crate) fn with_values(
        schema: &Arc<Schema>,
        pairs: Vec<(String, FieldValue)>,
    ) -> Result<Self> {
        let mut record = Self::empty(schema);
        record.assign(pairs)?;
        Ok(record)
    }

    /// Merge new values into this record.
    ///
    /// Fields absent from `args` keep their current value. On error the record
    /// is left unchanged.
    pub fn populate(&mut self, args: impl Into<Args>) -> Result<()> {
        let pairs = args.into().prepare()?.into_values()?;
        self.assign(pairs)
    }

    fn assign(&mut self, pairs: Vec<(String, FieldValue)>) -> Result<()> {
        let policy = self.schema.unknown_fields();
        let mut resolved = Vec::with_capacity(pairs.len());
        for (field, value) in pairs {
            match (self.schema.position(&field), policy) {
                (Some(position), _) => resolved.push((position, value)),
                (None, UnknownFields::Ignore) => {
                    tracing::debug!(
                        schema = self.schema.name(),
                        field = %field,
                        "ignoring undeclared field"
                    );
                }
                (None, UnknownFields::Reject) => {
                    return Err(RecordError::unknown_field(self.schema.name(), &field));
                }
            }
        }
        for (position, value) in resolved {
            self.values[position] = value;
        }
        Ok(())
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Result<&FieldValue> {
        self.position(field).map(|position| &self.values[position])
    }

    pub fn get_mut(&mut self, field: &str) -> Result<&mut FieldValue> {
        let position = self.position(field)?;
        Ok(&mut self.values[position])
    }

    /// Assign one declared field
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        *self.get_mut(field)? = value.into();
        Ok(())
    }

    fn position(&self, field: &str) -> Result<usize> {
        self.schema
            .position(field)
            .ok_or_else(|| RecordError::unknown_field(self.schema.name(), field))
    }

    /// Field/value pairs in declaration order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            fields: self.schema.fields().iter(),
            values: self.values.iter(),
        }
    }

    /// Number of declared fields, null or not
    pub fn field_count(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn into_pairs(self) -> Vec<(String, FieldValue)> {
        self.schema.fields().iter().cloned().zip(self.values).collect()
    }

    /// JSON object with exactly the declared fields, in order
    pub fn to_json(&self) -> Map<String, Value> {
        self.iter()
            .map(|(field, value)| (field.to_string(), value.to_json()))
            .collect()
    }

    /// Compact JSON text
    pub fn to_text(&self) -> String {
        self.render(OutputFormat::Compact)
    }

    pub fn to_pretty_text(&self) -> String {
        self.render(OutputFormat::Pretty)
    }

    pub fn render(&self, format: OutputFormat) -> String {
        let rendered = match format {
            OutputFormat::Compact => serde_json::to_string(self),
            OutputFormat::Pretty => serde_json::to_string_pretty(self),
        };
        rendered.unwrap_or_default()
    }

    /// Invoke a method from the schema's behavior table
    pub fn call(&mut self, method: &str, args: &[FieldValue]) -> Result<FieldValue> {
        let handler = self
            .schema
            .behavior()
            .get(method)
            .cloned()
            .ok_or_else(|| RecordError::UnknownMethod {
                schema: self.schema.name().to_string(),
                method: method.to_string(),
            })?;
        handler(self, args)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.schema.fields() == other.schema.fields()
            && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("schema", &self.schema.name())
            .field("fields", &DebugFields(self))
            .finish()
    }
}

struct DebugFields<'a>(&'a Record);

impl fmt::Debug for DebugFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a str, &'a FieldValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a record's fields in declaration order
#[derive(Clone)]
pub struct Iter<'a> {
    fields: std::slice::Iter<'a, String>,
    values: std::slice::Iter<'a, FieldValue>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a FieldValue);

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.fields.next()?;
        let value = self.values.next()?;
        Some((field.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}
