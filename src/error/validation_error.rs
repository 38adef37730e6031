//! Data validation error types.
//!
//! This module provides [`ValidationError`], the single failure returned when an
//! input does not satisfy a schema, along with [`ErrorKind`] and [`ErrorKey`].

use std::fmt::{self, Display};

use crate::path::{KeyPath, PathSegment};
use crate::value::Value;

/// The category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The value has the wrong kind, arity, or range.
    Shape,
    /// A required key is missing.
    Presence,
    /// The input carries keys the schema does not declare.
    UnknownKeys,
    /// The value matched none of the alternatives of an `or` type.
    UnionExhausted,
    /// A custom validator rejected the value.
    Custom,
    /// A nested schema referenced by name is not registered.
    UnresolvedReference,
    /// Nested schemas recursed past the configured maximum depth.
    DepthLimit,
}

impl ErrorKind {
    /// Returns a machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Shape => "invalid_type",
            ErrorKind::Presence => "required",
            ErrorKind::UnknownKeys => "unknown_keys",
            ErrorKind::UnionExhausted => "no_matching_type",
            ErrorKind::Custom => "custom",
            ErrorKind::UnresolvedReference => "unresolved_reference",
            ErrorKind::DepthLimit => "max_depth_exceeded",
        }
    }
}

/// Where a failing value sits relative to its enclosing container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKey {
    /// The top-level input itself.
    Root,
    /// A named key of a schema.
    Key(String),
    /// The keys rejected by the unknown-key check.
    Unknown(Vec<String>),
    /// An element of a list or tuple.
    Position(usize),
    /// A key of a parameterized map.
    MapKey,
    /// The value stored under the given key of a parameterized map.
    MapValue(Value),
}

impl ErrorKey {
    /// Returns the path segment that locates this key inside its container.
    pub fn segment(&self) -> PathSegment {
        match self {
            ErrorKey::Key(name) => PathSegment::Key(name.clone()),
            ErrorKey::Position(index) => PathSegment::Index(*index),
            ErrorKey::MapValue(key) => match key.as_identifier() {
                Some(name) => PathSegment::Key(name.to_string()),
                None => PathSegment::Key(key.to_string()),
            },
            other => PathSegment::Key(other.to_string()),
        }
    }
}

impl Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Root => f.write_str("input"),
            ErrorKey::Key(name) => write!(f, "'{}'", name),
            ErrorKey::Unknown(keys) => write!(f, "[{}]", keys.join(", ")),
            ErrorKey::Position(index) => write!(f, "element at position {}", index),
            ErrorKey::MapKey => f.write_str("map key"),
            ErrorKey::MapValue(key) => write!(f, "map key {}", key),
        }
    }
}

/// A validation failure with full context.
///
/// - **kind**: the failure category
/// - **key**: the offending key or structural position
/// - **value**: the rejected value, when there is one
/// - **message**: the human-readable description
/// - **path**: the keys enclosing `key`, outermost first
///
/// The path is empty where the failure originates. Each enclosing schema level
/// prepends its key as the error unwinds; `key`, `value` and `message` are
/// never changed on the way out.
///
/// # Example
///
/// ```rust
/// use optspec::{ErrorKey, KeySpec, Schema, Type, Value};
/// use serde_json::json;
///
/// let schema = Schema::new().key(
///     "a",
///     KeySpec::new(Type::Map).keys(
///         Schema::new().key("b", KeySpec::new(Type::Integer).required()),
///     ),
/// )
/// .compile()
/// .unwrap();
///
/// let error = schema.validate(&Value::from(json!({"a": {}}))).unwrap_err();
/// assert_eq!(error.key, ErrorKey::Key("b".to_string()));
/// assert_eq!(error.path.to_string(), "a");
/// assert_eq!(error.to_string(), "required key 'b' not found, received keys: [] (in a)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The failure category.
    pub kind: ErrorKind,
    /// The offending key or position.
    pub key: ErrorKey,
    /// The rejected value.
    pub value: Option<Value>,
    /// Human-readable error message.
    pub message: String,
    /// The enclosing keys, outermost first.
    pub path: KeyPath,
    causes: Vec<ValidationError>,
}

impl ValidationError {
    /// Creates a new error at `key` with an empty path.
    pub fn new(kind: ErrorKind, key: ErrorKey, message: impl Into<String>) -> Self {
        Self {
            kind,
            key,
            value: None,
            message: message.into(),
            path: KeyPath::root(),
            causes: Vec::new(),
        }
    }

    /// Sets the rejected value and returns self for chaining.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Records an underlying failure and returns self for chaining.
    pub fn with_cause(mut self, cause: ValidationError) -> Self {
        self.causes.push(cause);
        self
    }

    /// Records several underlying failures and returns self for chaining.
    pub fn with_causes(mut self, causes: impl IntoIterator<Item = ValidationError>) -> Self {
        self.causes.extend(causes);
        self
    }

    /// Returns the failures this error was built from.
    ///
    /// A composite failure (list, tuple, map) has one cause: the element that
    /// failed. A union failure has one cause per rejected alternative.
    pub fn causes(&self) -> &[ValidationError] {
        &self.causes
    }

    /// Returns this error one level further out, with `segment` prepended to
    /// the path.
    pub fn nest(mut self, segment: PathSegment) -> Self {
        self.path = self.path.prepend(segment);
        self
    }

    /// Returns true if the failure happened inside a nested schema.
    pub fn is_nested(&self) -> bool {
        !self.path.is_root()
    }

    /// Returns the machine-readable code of this error's kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if !self.path.is_root() {
            write!(f, " (in {})", self.path)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};
