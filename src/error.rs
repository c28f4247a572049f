//! Error types for schema registration and record construction

use thiserror::Error;

/// Result type for record operations
pub type Result<T> = std::result::Result<T, RecordError>;

/// Record factory errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Invalid schema source: {0}")]
    InvalidSchemaSource(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Too many arguments: expected at most 1 positional value, got {count}")]
    TooManyArguments { count: usize },

    #[error("Invalid source: {0}")]
    InvalidSource(String),

    #[error("Unknown field '{field}' on schema {schema}")]
    UnknownField { schema: String, field: String },

    #[error("Unknown method '{method}' on schema {schema}")]
    UnknownMethod { schema: String, method: String },

    #[error("Schema not found: {name}")]
    NotFound { name: String },

    #[error("Schema already exists with a different field set: {name}")]
    AlreadyExists { name: String },
}

impl RecordError {
    pub(crate) fn unknown_field(schema: &str, field: &str) -> Self {
        Self::UnknownField {
            schema: schema.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        Self::NotFound { name: name.to_string() }
    }
}
