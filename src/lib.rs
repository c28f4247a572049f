//! jsxn: schema-driven JSON records
//!
//! Name a record shape, get a record type with exactly that field set, and
//! convert its instances to and from JSON.
//!
//! ## Features
//!
//! - **Inferred Schemas**: The first construction under a new name defines the schema
//! - **Fixed Field Sets**: Every record holds exactly its schema's fields; unset fields are null
//! - **Five Input Shapes**: Nothing, named fields, a JSON object, JSON text, or another record
//! - **Extension**: Bundles merge fields and methods into an existing schema
//! - **Ordered Output**: JSON text follows declaration order
//!
//! ## Example
//!
//! ```
//! use jsxn::{Bundle, FieldValue, Jsxn};
//! use serde_json::json;
//!
//! let mut jsxn = Jsxn::new();
//! jsxn.construct("Point", json!({"x": 0, "y": 0})).unwrap();
//!
//! let point = jsxn.construct("Point", json!({"x": 5})).unwrap();
//! assert_eq!(point.to_text(), r#"{"x":5,"y":null}"#);
//!
//! jsxn.decorate(
//!     Bundle::new("Point")
//!         .field("z")
//!         .method("sum", |record, _| {
//!             let total: i64 = record.iter().filter_map(|(_, v)| v.as_json()?.as_i64()).sum();
//!             Ok(FieldValue::from(total))
//!         }),
//! )
//! .unwrap();
//!
//! let mut point = jsxn.construct("Point", r#"{"x": 1, "y": 2, "z": 3}"#).unwrap();
//! assert_eq!(point.call("sum", &[]).unwrap(), FieldValue::from(6));
//! ```

pub mod behavior;
pub mod config;
pub mod error;
pub mod factory;
pub mod record;
pub mod registry;
pub mod schema;
pub mod source;

pub use behavior::{Behavior, Bundle, Method};
pub use config::{JsxnConfig, OutputFormat, Redefine, RegistryConfig, UnknownFields};
pub use error::{RecordError, Result};
pub use factory::{Decorator, Deferred, Jsxn, Resolved};
pub use record::{FieldValue, Record};
pub use registry::SchemaRegistry;
pub use schema::Schema;
pub use source::{Args, Source};
