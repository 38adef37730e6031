//! # optspec
//!
//! A schema-driven structural validator for nested options.
//!
//! ## Overview
//!
//! A [`Schema`] declares the keys an input mapping may carry: their types,
//! whether they are required, their defaults, and the nested schemas of
//! container values. Validation walks the input against the schema and
//! returns either the normalized value, with defaults applied, or the first
//! violation as a [`ValidationError`] that names the offending key and the
//! path of enclosing keys.
//!
//! ## Core Types
//!
//! - [`Value`]: the dynamic data model being validated
//! - [`Schema`] and [`KeySpec`]: the schema language
//! - [`CompiledSchema`]: a checked schema, the only kind that validates input
//! - [`Type`]: the closed set of type descriptors
//! - [`ValidationError`]: a failed validation, with its [`KeyPath`]
//! - [`SchemaErrors`]: every problem found in a malformed schema
//! - [`Registry`]: named schemas and custom validators
//!
//! ## Example
//!
//! ```rust
//! use optspec::{validate, ErrorKey, KeySpec, Schema, Type, Value};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .key("url", KeySpec::new(Type::String).required())
//!     .key("connections", KeySpec::new(Type::NonNegInteger).default(5))
//!     .compile()
//!     .unwrap();
//!
//! let output = validate(&Value::from(json!({"url": "https://example.com"})), &schema).unwrap();
//! assert_eq!(output.get("connections"), Some(&Value::Integer(5)));
//!
//! let error = validate(&Value::from(json!({"connections": 3})), &schema).unwrap_err();
//! assert_eq!(error.key, ErrorKey::Key("url".to_string()));
//! assert_eq!(error.message, "required key 'url' not found, received keys: [connections]");
//! ```

mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validation;
pub mod value;

pub use error::{ErrorKey, ErrorKind, SchemaError, SchemaErrors, ValidationError};
pub use path::{KeyPath, PathSegment};
pub use registry::{Registry, RegistryError};
pub use schema::{
    normalize, validate_schema, Choices, CompiledSchema, CustomValidator, KeySpec, Keys, Schema,
    Type, WILDCARD,
};
pub use validation::{ValidationContext, DEFAULT_MAX_DEPTH};
pub use value::{Fun, Keywords, Map, Value};

/// Type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates `input` against `schema`.
///
/// Returns the normalized value on success. See [`CompiledSchema::validate`].
pub fn validate(input: &Value, schema: &CompiledSchema) -> ValidationResult<Value> {
    schema.validate(input)
}
